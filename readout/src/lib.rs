use nalgebra::DVector;

mod linear;

pub use linear::LinearReadout;

/// Generic way of mapping a bias-augmented extended state vector to a
/// predicted output vector
///
/// # Parameters
/// extended_state: `[output_bias; scaled input; reservoir state]`, the same
/// layout as one column of the design matrix
pub trait Readout {
    /// Predict the output vector for one extended state
    fn predict(&self, extended_state: &DVector<f64>) -> DVector<f64>;
}
