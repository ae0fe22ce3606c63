use nalgebra::DMatrix;

use crate::{Esn, EsnError, StateMatrix};

impl Esn {
    /// Estimates the washout length by running perturbed trajectories from
    /// distinct initial states (all zeros and all ones) through the same
    /// driving sequence.
    ///
    /// Once every pair of trajectories has stayed componentwise within
    /// `epsilon` for `proximity_length` consecutive steps, the step count at
    /// the start of that run is returned. A sequence that ends without such a
    /// run is reported as [`EsnError::TransientNotFound`].
    ///
    /// The reservoir state of `self` is left untouched; only the owned random
    /// generator advances.
    pub fn estimate_transient_time(
        &mut self,
        inputs: Option<&DMatrix<f64>>,
        targets: Option<&DMatrix<f64>>,
        epsilon: f64,
        proximity_length: usize,
    ) -> Result<usize, EsnError> {
        let length = match (inputs, targets) {
            (Some(inputs), _) => inputs.nrows(),
            (None, Some(targets)) => targets.nrows(),
            (None, None) => return Err(EsnError::UndeterminedLength),
        };
        self.check_sequence_dimensions(inputs, targets)?;

        let n = self.params.n_reservoir;
        let mut trajectories = vec![
            StateMatrix::zeros(n),
            StateMatrix::from_element(n, 1.0),
        ];

        let mut consecutive_close = 0;
        for t in 0..length {
            if all_pairs_close(&trajectories, epsilon) {
                if consecutive_close >= proximity_length {
                    debug!("transient time found at step {}", t - proximity_length);
                    return Ok(t - proximity_length);
                }
                consecutive_close += 1;
            } else {
                consecutive_close = 0;
            }

            let u = inputs.map(|m| m.row(t).transpose());
            let y = targets.map(|m| m.row(t).transpose());
            for x in trajectories.iter_mut() {
                self.step(x, u.as_ref(), y.as_ref());
            }
        }

        Err(EsnError::TransientNotFound)
    }

    /// Drives a fresh all-zero state through the sequence and returns it
    /// right after the update at `step`
    pub fn state_at(
        &mut self,
        inputs: Option<&DMatrix<f64>>,
        targets: Option<&DMatrix<f64>>,
        step: usize,
    ) -> Result<StateMatrix, EsnError> {
        let length = match (inputs, targets) {
            (Some(inputs), _) => inputs.nrows(),
            (None, Some(targets)) => targets.nrows(),
            (None, None) => return Err(EsnError::UndeterminedLength),
        };
        self.check_sequence_dimensions(inputs, targets)?;
        if step >= length {
            return Err(EsnError::StepOutOfRange {
                step,
                length,
            });
        }

        let mut x = StateMatrix::zeros(self.params.n_reservoir);
        for t in 0..=step {
            let u = inputs.map(|m| m.row(t).transpose());
            let y = targets.map(|m| m.row(t).transpose());
            self.step(&mut x, u.as_ref(), y.as_ref());
        }

        Ok(x)
    }
}

fn all_pairs_close(trajectories: &[StateMatrix], epsilon: f64) -> bool {
    for i in 0..trajectories.len() {
        for j in i + 1..trajectories.len() {
            let close = trajectories[i]
                .iter()
                .zip(trajectories[j].iter())
                .all(|(a, b)| (a - b).abs() < epsilon);
            if !close {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;

    use crate::{Esn, EsnError, Params, StateMatrix, WeightGeneration};

    fn driving_inputs(length: usize) -> DMatrix<f64> {
        DMatrix::from_fn(length, 1, |t, _| (t as f64 * 0.05).sin())
    }

    fn contracting_params() -> Params {
        let mut params = Params::new(1, 30, 1);
        params.seed = Some(77);
        params.noise_level = 0.0;
        params.spectral_radius = 0.1;
        params.reservoir_density = 0.5;
        params
    }

    #[test]
    fn contracting_reservoir_has_finite_transient() {
        let mut esn = Esn::new(contracting_params(), WeightGeneration::DenseRandom).unwrap();
        let inputs = driving_inputs(400);

        let transient_time = esn.estimate_transient_time(Some(&inputs), None, 1e-4, 10).unwrap();
        assert!(transient_time < 400);

        // the live state is not consumed by the estimate
        assert!(esn.state().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn non_contracting_reservoir_reports_no_transient() {
        let mut params = contracting_params();
        params.spectral_radius = 30.0;
        let mut esn = Esn::new(params, WeightGeneration::DenseRandom).unwrap();
        let inputs = driving_inputs(200);

        let err = esn.estimate_transient_time(Some(&inputs), None, 1e-12, 20).unwrap_err();
        assert_eq!(err, EsnError::TransientNotFound);
    }

    #[test]
    fn transient_needs_a_driving_sequence() {
        let mut esn = Esn::new(contracting_params(), WeightGeneration::DenseRandom).unwrap();
        let err = esn.estimate_transient_time(None, None, 1e-4, 10).unwrap_err();
        assert_eq!(err, EsnError::UndeterminedLength);
    }

    #[test]
    fn state_at_matches_a_manually_driven_network() {
        let inputs = driving_inputs(20);

        let mut esn = Esn::new(contracting_params(), WeightGeneration::DenseRandom).unwrap();
        let at = esn.state_at(Some(&inputs), None, 5).unwrap();
        assert_eq!(at.len(), 30);

        let mut manual = Esn::new(contracting_params(), WeightGeneration::DenseRandom).unwrap();
        for t in 0..=5 {
            let u: StateMatrix = inputs.row(t).transpose();
            manual.update(Some(&u), None);
        }
        for i in 0..30 {
            assert!((at[i] - manual.state()[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn state_at_rejects_out_of_range_steps() {
        let mut esn = Esn::new(contracting_params(), WeightGeneration::DenseRandom).unwrap();
        let inputs = driving_inputs(10);
        let err = esn.state_at(Some(&inputs), None, 10).unwrap_err();
        assert_eq!(
            err,
            EsnError::StepOutOfRange {
                step: 10,
                length: 10
            }
        );
    }
}
