use common::Activation;

use crate::StateMatrix;

/// The parameters of the Echo State Network
#[derive(Debug, Clone)]
pub struct Params {
    /// Input dimensionality; zero is allowed when feedback drives the network
    pub n_input: usize,
    /// Number of nodes in the reservoir
    pub n_reservoir: usize,
    /// Output dimensionality
    pub n_output: usize,

    /// Controls the retention of information from previous time steps.
    /// The spectral radius determines how fast the influence of an input
    /// dies out in a reservoir with time, and how stable the reservoir
    /// activations are. The spectral radius should be greater in tasks
    /// requiring longer memory of the input.
    pub spectral_radius: f64,
    /// Tunes the decay time of internal activity of the network.
    /// The leaking rate can be regarded as the speed of the reservoir
    /// update dynamics discretized in time; 1.0 replaces the previous
    /// state entirely at each step.
    pub leaking_rate: f64,
    /// Scales the uniform noise added to the state transition once per step
    pub noise_level: f64,
    /// Connection probability within the reservoir
    pub reservoir_density: f64,
    /// Fraction of input connections each reservoir node keeps
    pub input_density: f64,
    /// Scales the feedback weight matrix
    pub feedback_scaling: f64,
    /// Bias prepended to the input vector in the state update
    pub bias: f64,
    /// Bias prepended to the extended state in the design matrix
    pub output_bias: f64,
    /// Per-dimension input scaling; its length must equal `n_input`
    pub input_scaling: Vec<f64>,
    /// Scales the input block of the design matrix
    pub output_input_scaling: f64,
    /// Whether output feedback drives the reservoir
    pub feedback: bool,
    /// Activation function of the reservoir state transition
    pub activation: Activation,
    /// Optional seed for Rng
    pub seed: Option<u64>,
}

impl Params {
    /// Parameters with the usual literature defaults for the given dimensions
    pub fn new(n_input: usize, n_reservoir: usize, n_output: usize) -> Self {
        Self {
            n_input,
            n_reservoir,
            n_output,
            spectral_radius: 1.0,
            leaking_rate: 1.0,
            noise_level: 0.01,
            reservoir_density: 0.2,
            input_density: 1.0,
            feedback_scaling: 1.0,
            bias: 1.0,
            output_bias: 1.0,
            input_scaling: vec![1.0; n_input],
            output_input_scaling: 1.0,
            feedback: false,
            activation: Activation::Tanh,
            seed: None,
        }
    }

    /// The scaling `[1.0] ++ input_scaling` applied columnwise to the
    /// bias-augmented input weight matrix
    pub(crate) fn expanded_input_scaling(&self) -> StateMatrix {
        StateMatrix::from_fn(1 + self.n_input, |i, _| {
            if i == 0 {
                1.0
            } else {
                self.input_scaling[i - 1]
            }
        })
    }
}
