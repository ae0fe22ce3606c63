//! This crate provides the shared numeric capabilities: activation functions
//! and dominant-eigenvalue estimation.

#![deny(unused_imports, unused_crate_dependencies)]
#![warn(missing_docs)]

mod activation;
mod eigen;

pub use activation::Activation;
pub use eigen::{dominant_eigenvalue, power_iteration};
