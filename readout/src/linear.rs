use common::Activation;
use nalgebra::{DMatrix, DVector};

use super::Readout;

/// Linear readout backed by a fixed weight matrix with one row per output
/// dimension and one column per extended state entry. Fitting the weights is
/// the job of an external training procedure.
#[derive(Debug, Clone)]
pub struct LinearReadout {
    /// Maps extended states to outputs
    pub weights: DMatrix<f64>,
    /// Activation applied to the linear prediction
    pub output_activation: Activation,
}

impl LinearReadout {
    /// A readout with identity output activation
    pub fn new(weights: DMatrix<f64>) -> Self {
        Self {
            weights,
            output_activation: Activation::Identity,
        }
    }
}

impl Readout for LinearReadout {
    fn predict(&self, extended_state: &DVector<f64>) -> DVector<f64> {
        let mut pred = &self.weights * extended_state;
        self.output_activation.activate(pred.as_mut_slice());

        pred
    }
}

#[cfg(test)]
mod tests {
    use round::round;

    use super::*;

    #[test]
    fn linear_readout_predict() {
        let weights = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, -1.0]);
        let readout = LinearReadout::new(weights);

        let extended_state = DVector::from_vec(vec![1.0, 0.5, 2.0]);
        let pred = readout.predict(&extended_state);

        assert_eq!(pred.len(), 1);
        assert_eq!(round(pred[0], 6), 0.0);
    }

    #[test]
    fn linear_readout_output_activation() {
        let weights = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, -1.0, 0.0]);
        let readout = LinearReadout {
            weights,
            output_activation: Activation::Relu,
        };

        let extended_state = DVector::from_vec(vec![3.0, 1.0]);
        let pred = readout.predict(&extended_state);

        assert_eq!(pred[0], 3.0);
        assert_eq!(pred[1], 0.0);
    }
}
