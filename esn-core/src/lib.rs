#[macro_use]
extern crate log;

use nalgebra::{Const, Dyn, Matrix, VecStorage};

mod constructor;
mod diagnostics;
mod error;
mod esn;
mod params;
mod propagate;
mod transient;

pub use constructor::WeightGeneration;
pub use diagnostics::{autocorrelation, sliding_window_difference};
pub use error::EsnError;
pub use esn::{Esn, Feedback};
pub use params::Params;
pub use propagate::Propagation;

pub type StateMatrix = Matrix<f64, Dyn, Const<1>, VecStorage<f64, Dyn, Const<1>>>;
