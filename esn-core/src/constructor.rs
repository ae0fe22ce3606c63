use nalgebra::{DMatrix, Dim, Matrix};
use nanorand::{Rng, WyRand};

use crate::{EsnError, Params};

/// Iteration cap of the sparse dominant-eigenvalue estimate before the dense
/// eigendecomposition takes over
const POWER_ITERATION_STEPS: usize = 1_000;
const POWER_ITERATION_TOLERANCE: f64 = 1e-10;

/// Strategies for generating the recurrent weight matrix
#[derive(Debug, Clone)]
pub enum WeightGeneration {
    /// Uniform entries in [-0.5, 0.5], sparsified, rescaled to the target
    /// spectral radius through a full eigendecomposition
    DenseRandom,
    /// Product of random Givens rotations until the requested density is
    /// reached; rotations are norm preserving, so the spectral radius is
    /// applied as a direct scalar
    OrthogonalComposition,
    /// Nonnegative uniform entries in [0, 0.5], sparsified, rescaled via an
    /// iterative dominant-eigenvalue estimate (with dense fallback), then an
    /// independent sign flip per entry
    SignRandomizedSparse,
    /// No generation; the caller supplies the unit-scale base matrices to
    /// which the configured scalings are applied
    Custom {
        /// Square reservoir matrix of dimension `n_reservoir`
        reservoir: DMatrix<f64>,
        /// Input matrix of shape `(n_reservoir, 1 + n_input)`
        input: DMatrix<f64>,
        /// Feedback matrix of shape `(n_reservoir, 1 + n_output)`; must be
        /// present exactly when the feedback flag is set
        feedback: Option<DMatrix<f64>>,
    },
}

/// Generates the weight matrices of an Echo State Network from a shared
/// explicit generator instance
pub(crate) struct ReservoirConstructor<'a> {
    params: &'a Params,
    rng: &'a mut WyRand,
}

impl<'a> ReservoirConstructor<'a> {
    pub(crate) fn new(params: &'a Params, rng: &'a mut WyRand) -> Self {
        Self {
            params,
            rng,
        }
    }

    /// Reservoir base matrix with unit spectral radius, dense-random strategy
    pub(crate) fn dense_random(&mut self) -> Result<DMatrix<f64>, EsnError> {
        let n = self.params.n_reservoir;
        let mut w: DMatrix<f64> =
            Matrix::from_fn_generic(Dim::from_usize(n), Dim::from_usize(n), |_, _| {
                self.rng.generate::<f64>() - 0.5
            });
        self.sparsify(&mut w);

        let dominant = common::dominant_eigenvalue(&w);
        if dominant == 0.0 {
            return Err(EsnError::DegenerateReservoir);
        }

        Ok(w / dominant)
    }

    /// Reservoir base matrix with unit spectral radius, built by composing
    /// random Givens rotations until the nonzero count reaches
    /// `reservoir_density * n^2`
    pub(crate) fn orthogonal_composition(&mut self) -> DMatrix<f64> {
        let n = self.params.n_reservoir;
        let mut w: DMatrix<f64> = DMatrix::identity(n, n);
        if n < 2 {
            return w;
        }

        let target_nonzero = (self.params.reservoir_density * (n * n) as f64) as usize;
        while w.iter().filter(|v| **v != 0.0).count() < target_nonzero {
            let h = self.rng.generate_range(0..n);
            let mut k = self.rng.generate_range(0..n);
            while k == h {
                k = self.rng.generate_range(0..n);
            }
            let phi = self.rng.generate::<f64>() * std::f64::consts::TAU;
            let (sin, cos) = phi.sin_cos();

            // left-multiplying by the rotation only touches rows h and k
            for j in 0..n {
                let a = w[(h, j)];
                let b = w[(k, j)];
                w[(h, j)] = cos * a - sin * b;
                w[(k, j)] = sin * a + cos * b;
            }
        }

        w
    }

    /// Reservoir base matrix with unit spectral radius and randomized signs
    pub(crate) fn sign_randomized_sparse(&mut self) -> Result<DMatrix<f64>, EsnError> {
        let n = self.params.n_reservoir;
        let mut w: DMatrix<f64> =
            Matrix::from_fn_generic(Dim::from_usize(n), Dim::from_usize(n), |_, _| {
                self.rng.generate::<f64>() / 2.0
            });
        self.sparsify(&mut w);

        let dominant =
            match common::power_iteration(&w, POWER_ITERATION_STEPS, POWER_ITERATION_TOLERANCE) {
                Some(ev) => ev,
                None => {
                    debug!("power iteration did not converge, using the dense eigendecomposition");
                    common::dominant_eigenvalue(&w)
                }
            };
        if dominant == 0.0 {
            return Err(EsnError::DegenerateReservoir);
        }
        w /= dominant;

        for v in w.iter_mut() {
            if self.rng.generate::<f64>() < 0.5 {
                *v = -*v;
            }
        }

        Ok(w)
    }

    /// Input weight matrix before the expanded input scaling is applied
    pub(crate) fn input_base(&mut self) -> DMatrix<f64> {
        let n = self.params.n_reservoir;
        let cols = 1 + self.params.n_input;
        let mut w_input: DMatrix<f64> =
            Matrix::from_fn_generic(Dim::from_usize(n), Dim::from_usize(cols), |_, _| {
                self.rng.generate::<f64>() - 0.5
            });

        if self.params.input_density < 1.0 {
            let keep = (self.params.input_density * self.params.n_input as f64) as usize;
            let mut columns: Vec<usize> = (0..cols).collect();
            for r in 0..n {
                // Fisher-Yates draw of the connections this node keeps,
                // the bias column takes part in the draw
                for i in (1..columns.len()).rev() {
                    let j = self.rng.generate_range(0..=i);
                    columns.swap(i, j);
                }
                for &c in &columns[keep..] {
                    w_input[(r, c)] = 0.0;
                }
            }
        }

        w_input
    }

    /// Feedback weight matrix before the feedback scaling is applied
    pub(crate) fn feedback_base(&mut self) -> DMatrix<f64> {
        let n = self.params.n_reservoir;
        let cols = 1 + self.params.n_output;
        Matrix::from_fn_generic(Dim::from_usize(n), Dim::from_usize(cols), |_, _| {
            self.rng.generate::<f64>() - 0.5
        })
    }

    /// Zeroes each entry with probability `1 - reservoir_density`
    fn sparsify(&mut self, w: &mut DMatrix<f64>) {
        for v in w.iter_mut() {
            if self.rng.generate::<f64>() > self.params.reservoir_density {
                *v = 0.0;
            }
        }
    }
}
