use thiserror::Error;

/// All the ways construction or propagation of an Echo State Network can fail
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EsnError {
    #[error("dimension of input scaling ({got}) does not match the input dimension ({expected})")]
    InputScalingDimension { expected: usize, got: usize },

    #[error("custom {name} matrix has shape ({rows}, {cols}), expected ({expected_rows}, {expected_cols})")]
    CustomMatrixShape {
        name: &'static str,
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("presence of the custom feedback matrix does not match the feedback flag")]
    FeedbackMismatch,

    #[error("generated reservoir is degenerate, its dominant eigenvalue is zero")]
    DegenerateReservoir,

    #[error("{name} sequence has {got} columns, expected {expected}")]
    SequenceDimension {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("neither inputs, targets nor an explicit step count determine the sequence length")]
    UndeterminedLength,

    #[error("transient time {transient_time} exceeds the sequence length {length}")]
    TransientTooLong { transient_time: usize, length: usize },

    #[error("an input sequence is required for this configuration")]
    InputRequired,

    #[error("a readout is required for autoregressive generation")]
    ReadoutRequired,

    #[error("feedback is disabled for this network")]
    FeedbackDisabled,

    #[error("no stable transient found within the driving sequence")]
    TransientNotFound,

    #[error("requested step {step} is beyond the sequence length {length}")]
    StepOutOfRange { step: usize, length: usize },
}
