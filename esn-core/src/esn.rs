use nalgebra::DMatrix;
use nanorand::{Rng, WyRand};

use crate::{constructor::ReservoirConstructor, EsnError, Params, StateMatrix, WeightGeneration};

/// Feedback capability of the network, resolved once at construction so the
/// per-step hot path never probes a nullable matrix
#[derive(Debug, Clone)]
pub enum Feedback {
    /// Output feedback drives the reservoir
    Enabled {
        /// Unscaled base matrix, kept for drift-free rescaling
        base: DMatrix<f64>,
        /// `base * feedback_scaling`, used in the state update
        scaled: DMatrix<f64>,
    },
    /// No feedback matrix exists
    Disabled,
}

/// The computational core of a leaky Echo State Network.
///
/// Owns the weight matrices, the reservoir state and an explicit random
/// generator; all randomness (construction, masking, rotation sampling and
/// per-step noise) is reproducible from the seed in [`Params`].
#[derive(Debug)]
pub struct Esn {
    pub(crate) params: Params,
    /// Reservoir base matrix with unit spectral radius
    pub(crate) w_base: DMatrix<f64>,
    /// `w_base * spectral_radius`
    pub(crate) w: DMatrix<f64>,
    /// Input weights before the per-column input scaling
    pub(crate) w_input_base: DMatrix<f64>,
    /// Input weights with the expanded input scaling applied
    pub(crate) w_input: DMatrix<f64>,
    pub(crate) feedback: Feedback,
    pub(crate) expanded_input_scaling: StateMatrix,
    pub(crate) state: StateMatrix,
    pub(crate) rng: WyRand,
}

impl Esn {
    /// Create a new reservoir under the given weight-generation strategy
    pub fn new(params: Params, weight_generation: WeightGeneration) -> Result<Self, EsnError> {
        if params.input_scaling.len() != params.n_input {
            return Err(EsnError::InputScalingDimension {
                expected: params.n_input,
                got: params.input_scaling.len(),
            });
        }

        let mut rng = match params.seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };

        let mut constructor = ReservoirConstructor::new(&params, &mut rng);
        let (w_base, w_input_base, feedback_base) = match weight_generation {
            WeightGeneration::DenseRandom => {
                let w_base = constructor.dense_random()?;
                let w_input_base = constructor.input_base();
                let feedback_base = params.feedback.then(|| constructor.feedback_base());
                (w_base, w_input_base, feedback_base)
            }
            WeightGeneration::OrthogonalComposition => {
                let w_base = constructor.orthogonal_composition();
                let w_input_base = constructor.input_base();
                let feedback_base = params.feedback.then(|| constructor.feedback_base());
                (w_base, w_input_base, feedback_base)
            }
            WeightGeneration::SignRandomizedSparse => {
                let w_base = constructor.sign_randomized_sparse()?;
                let w_input_base = constructor.input_base();
                let feedback_base = params.feedback.then(|| constructor.feedback_base());
                (w_base, w_input_base, feedback_base)
            }
            WeightGeneration::Custom {
                reservoir,
                input,
                feedback,
            } => {
                validate_custom(&params, &reservoir, &input, feedback.as_ref())?;
                (reservoir, input, feedback)
            }
        };

        let expanded_input_scaling = params.expanded_input_scaling();
        let w = &w_base * params.spectral_radius;
        let w_input = scale_input_columns(&w_input_base, &expanded_input_scaling);
        let feedback = match feedback_base {
            Some(base) => {
                let scaled = &base * params.feedback_scaling;
                Feedback::Enabled {
                    base,
                    scaled,
                }
            }
            None => Feedback::Disabled,
        };
        let state = StateMatrix::zeros(params.n_reservoir);
        trace!("w: {}\nw_input: {}", w, w_input);

        Ok(Self {
            params,
            w_base,
            w,
            w_input_base,
            w_input,
            feedback,
            expanded_input_scaling,
            state,
            rng,
        })
    }

    /// Resets the reservoir state to the zero vector
    #[inline(always)]
    pub fn reset_state(&mut self) {
        self.state = StateMatrix::zeros(self.params.n_reservoir);
    }

    /// Applies one discrete-time update to the reservoir state.
    ///
    /// `output` is the feedback signal of this step and only contributes when
    /// feedback is enabled. Returns the unscaled input actually consumed,
    /// which is empty when the network has no input dimensions.
    pub fn update(
        &mut self,
        input: Option<&StateMatrix>,
        output: Option<&StateMatrix>,
    ) -> StateMatrix {
        let mut x = std::mem::replace(&mut self.state, StateMatrix::zeros(0));
        self.step(&mut x, input, output);
        self.state = x;

        match input {
            Some(u) if self.params.n_input != 0 => u.clone_owned(),
            _ => StateMatrix::zeros(0),
        }
    }

    /// One state transition, operating on an externally owned state vector so
    /// that perturbed trajectories can share the network
    pub(crate) fn step(
        &mut self,
        x: &mut StateMatrix,
        input: Option<&StateMatrix>,
        feedback_signal: Option<&StateMatrix>,
    ) {
        let mut transmission: StateMatrix = &self.w * &*x;
        if self.params.n_input != 0 {
            if let Some(u) = input {
                let biased_input: StateMatrix =
                    StateMatrix::from_fn(1 + self.params.n_input, |i, _| {
                        if i == 0 {
                            self.params.bias
                        } else {
                            u[i - 1]
                        }
                    });
                transmission += &self.w_input * biased_input;
            }
        }
        if let Feedback::Enabled {
            scaled, ..
        } = &self.feedback
        {
            if let Some(y) = feedback_signal {
                let biased_output: StateMatrix =
                    StateMatrix::from_fn(1 + self.params.n_output, |i, _| {
                        if i == 0 {
                            self.params.output_bias
                        } else {
                            y[i - 1]
                        }
                    });
                transmission += scaled * biased_output;
            }
        }

        // one noise draw per step, shared by all reservoir nodes
        let noise = (self.rng.generate::<f64>() - 0.5) * self.params.noise_level;
        transmission.add_scalar_mut(noise);
        self.params.activation.activate(transmission.as_mut_slice());

        *x = (1.0 - self.params.leaking_rate) * &*x + self.params.leaking_rate * transmission;
    }

    /// Retargets the spectral radius, recomputing from the unit-scale base to
    /// avoid accumulating floating point drift across repeated calls
    pub fn set_spectral_radius(&mut self, spectral_radius: f64) {
        self.params.spectral_radius = spectral_radius;
        self.w = &self.w_base * spectral_radius;
    }

    #[inline(always)]
    pub fn set_leaking_rate(&mut self, leaking_rate: f64) {
        self.params.leaking_rate = leaking_rate;
    }

    #[inline(always)]
    pub fn set_noise_level(&mut self, noise_level: f64) {
        self.params.noise_level = noise_level;
    }

    /// Replaces the per-dimension input scaling and recomputes the input
    /// weights from their unscaled base
    pub fn set_input_scaling(&mut self, input_scaling: Vec<f64>) -> Result<(), EsnError> {
        if input_scaling.len() != self.params.n_input {
            return Err(EsnError::InputScalingDimension {
                expected: self.params.n_input,
                got: input_scaling.len(),
            });
        }
        self.params.input_scaling = input_scaling;
        self.expanded_input_scaling = self.params.expanded_input_scaling();
        self.w_input = scale_input_columns(&self.w_input_base, &self.expanded_input_scaling);

        Ok(())
    }

    /// Retargets the feedback scaling, recomputing from the unscaled base
    pub fn set_feedback_scaling(&mut self, feedback_scaling: f64) -> Result<(), EsnError> {
        match &mut self.feedback {
            Feedback::Enabled {
                base,
                scaled,
            } => {
                *scaled = &*base * feedback_scaling;
                self.params.feedback_scaling = feedback_scaling;
                Ok(())
            }
            Feedback::Disabled => Err(EsnError::FeedbackDisabled),
        }
    }

    #[inline(always)]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[inline(always)]
    pub fn state(&self) -> &StateMatrix {
        &self.state
    }

    /// The scaled recurrent weight matrix
    #[inline(always)]
    pub fn reservoir_weights(&self) -> &DMatrix<f64> {
        &self.w
    }

    /// The scaled input weight matrix
    #[inline(always)]
    pub fn input_weights(&self) -> &DMatrix<f64> {
        &self.w_input
    }

    /// Rejects input or target sequences whose width does not match the
    /// configured dimensions before any step indexes into them
    pub(crate) fn check_sequence_dimensions(
        &self,
        inputs: Option<&DMatrix<f64>>,
        targets: Option<&DMatrix<f64>>,
    ) -> Result<(), EsnError> {
        if let Some(inputs) = inputs {
            if inputs.ncols() != self.params.n_input {
                return Err(EsnError::SequenceDimension {
                    name: "input",
                    expected: self.params.n_input,
                    got: inputs.ncols(),
                });
            }
        }
        if let Some(targets) = targets {
            if targets.ncols() != self.params.n_output {
                return Err(EsnError::SequenceDimension {
                    name: "target",
                    expected: self.params.n_output,
                    got: targets.ncols(),
                });
            }
        }

        Ok(())
    }

    /// The scaled feedback weight matrix, if feedback is enabled
    pub fn feedback_weights(&self) -> Option<&DMatrix<f64>> {
        match &self.feedback {
            Feedback::Enabled {
                scaled, ..
            } => Some(scaled),
            Feedback::Disabled => None,
        }
    }
}

/// Applies the expanded input scaling columnwise
pub(crate) fn scale_input_columns(
    base: &DMatrix<f64>,
    expanded_input_scaling: &StateMatrix,
) -> DMatrix<f64> {
    let mut scaled = base.clone();
    for (c, mut column) in scaled.column_iter_mut().enumerate() {
        column *= expanded_input_scaling[c];
    }

    scaled
}

fn validate_custom(
    params: &Params,
    reservoir: &DMatrix<f64>,
    input: &DMatrix<f64>,
    feedback: Option<&DMatrix<f64>>,
) -> Result<(), EsnError> {
    let n = params.n_reservoir;
    if reservoir.shape() != (n, n) {
        return Err(EsnError::CustomMatrixShape {
            name: "reservoir",
            rows: reservoir.nrows(),
            cols: reservoir.ncols(),
            expected_rows: n,
            expected_cols: n,
        });
    }
    if input.shape() != (n, 1 + params.n_input) {
        return Err(EsnError::CustomMatrixShape {
            name: "input",
            rows: input.nrows(),
            cols: input.ncols(),
            expected_rows: n,
            expected_cols: 1 + params.n_input,
        });
    }
    match (params.feedback, feedback) {
        (true, Some(feedback)) => {
            if feedback.shape() != (n, 1 + params.n_output) {
                return Err(EsnError::CustomMatrixShape {
                    name: "feedback",
                    rows: feedback.nrows(),
                    cols: feedback.ncols(),
                    expected_rows: n,
                    expected_cols: 1 + params.n_output,
                });
            }
            Ok(())
        }
        (false, None) => Ok(()),
        _ => Err(EsnError::FeedbackMismatch),
    }
}
