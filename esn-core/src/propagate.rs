use nalgebra::DMatrix;
use readout::Readout;

use crate::{Esn, EsnError, Feedback, StateMatrix};

/// The matrices assembled by one propagation call
#[derive(Debug)]
pub struct Propagation {
    /// `1 + n_input + n_reservoir` rows, one column per retained step
    pub design: DMatrix<f64>,
    /// Generated output sequence with one row per retained step; only
    /// produced by autoregressive generation
    pub generated: Option<DMatrix<f64>>,
}

/// The operating mode, resolved once before the sequence loop
enum Mode<'a> {
    /// Feedback disabled, driven purely by the input sequence
    Driven,
    /// Feedback enabled with known targets fed back at every step
    TeacherForced { targets: &'a DMatrix<f64> },
    /// Feedback enabled, the previous prediction is fed back
    Generative { readout: &'a dyn Readout },
}

impl Esn {
    /// Drives the state update across a sequence and assembles the design
    /// matrix, with the first `transient_time` steps discarded.
    ///
    /// The sequence length is taken from `inputs`, else from `targets`, else
    /// from `steps`. Input sequences have one row per step and one column per
    /// input dimension; targets one row per step and one column per output
    /// dimension. The reservoir state keeps its post-sequence value.
    pub fn propagate(
        &mut self,
        inputs: Option<&DMatrix<f64>>,
        targets: Option<&DMatrix<f64>>,
        steps: Option<usize>,
        transient_time: usize,
        readout: Option<&dyn Readout>,
    ) -> Result<Propagation, EsnError> {
        let length = match (inputs, targets, steps) {
            (Some(inputs), _, _) => inputs.nrows(),
            (None, Some(targets), _) => targets.nrows(),
            (None, None, Some(steps)) => steps,
            (None, None, None) => return Err(EsnError::UndeterminedLength),
        };
        if transient_time > length {
            return Err(EsnError::TransientTooLong {
                transient_time,
                length,
            });
        }
        self.check_sequence_dimensions(inputs, targets)?;

        let feedback_enabled = matches!(self.feedback, Feedback::Enabled { .. });
        // the input sequence is only optional for a pure feedback network
        if inputs.is_none() && (!feedback_enabled || self.params.n_input != 0) {
            return Err(EsnError::InputRequired);
        }
        let mode = if !feedback_enabled {
            Mode::Driven
        } else if let Some(targets) = targets {
            Mode::TeacherForced {
                targets,
            }
        } else {
            Mode::Generative {
                readout: readout.ok_or(EsnError::ReadoutRequired)?,
            }
        };

        let retained = length - transient_time;
        let design_rows = 1 + self.params.n_input + self.params.n_reservoir;
        let mut design: DMatrix<f64> = DMatrix::zeros(design_rows, retained);
        let mut generated = None;

        let mut x = std::mem::replace(&mut self.state, StateMatrix::zeros(0));
        match mode {
            Mode::Driven => {
                for t in 0..length {
                    let u = inputs.map(|m| m.row(t).transpose());
                    self.step(&mut x, u.as_ref(), None);
                    if t >= transient_time {
                        design.set_column(t - transient_time, &self.extended_state(u.as_ref(), &x));
                    }
                }
            }
            Mode::TeacherForced {
                targets,
            } => {
                let mut previous_output = StateMatrix::zeros(self.params.n_output);
                for t in 0..length {
                    let u = inputs.map(|m| m.row(t).transpose());
                    self.step(&mut x, u.as_ref(), Some(&previous_output));
                    if t >= transient_time {
                        design.set_column(t - transient_time, &self.extended_state(u.as_ref(), &x));
                    }
                    previous_output = targets.row(t).transpose();
                }
            }
            Mode::Generative {
                readout,
            } => {
                let mut outputs: DMatrix<f64> = DMatrix::zeros(retained, self.params.n_output);
                let mut previous_output = StateMatrix::zeros(self.params.n_output);
                for t in 0..length {
                    let u = inputs.map(|m| m.row(t).transpose());
                    self.step(&mut x, u.as_ref(), Some(&previous_output));
                    let extended = self.extended_state(u.as_ref(), &x);
                    previous_output = readout.predict(&extended);
                    if t >= transient_time {
                        outputs.row_mut(t - transient_time).copy_from(&previous_output.transpose());
                        design.set_column(t - transient_time, &extended);
                    }
                }
                generated = Some(outputs);
            }
        }
        self.state = x;

        debug!("propagate: design dims ({}, {})", design.nrows(), design.ncols());

        Ok(Propagation {
            design,
            generated,
        })
    }

    /// One design matrix column: `[output_bias; output_input_scaling * u; x]`
    pub(crate) fn extended_state(&self, u: Option<&StateMatrix>, x: &StateMatrix) -> StateMatrix {
        let n_input = self.params.n_input;
        StateMatrix::from_fn(1 + n_input + self.params.n_reservoir, |i, _| {
            if i == 0 {
                self.params.output_bias
            } else if i <= n_input {
                match u {
                    Some(u) => self.params.output_input_scaling * u[i - 1],
                    None => 0.0,
                }
            } else {
                x[i - 1 - n_input]
            }
        })
    }
}
