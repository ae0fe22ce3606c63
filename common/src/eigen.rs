use nalgebra::{DMatrix, Normed, Schur};

/// Iteration cap of the QR algorithm; the iteration does not terminate on
/// its own for some degenerate matrices
const SCHUR_MAX_ITERATIONS: usize = 10_000;

/// Largest eigenvalue magnitude of a square matrix, computed from the full
/// complex eigendecomposition.
///
/// An exactly-zero matrix, or one whose Schur decomposition does not
/// converge within the iteration cap, reports a dominant eigenvalue of zero
/// so that callers surface it as a degenerate configuration.
pub fn dominant_eigenvalue(matrix: &DMatrix<f64>) -> f64 {
    if matrix.iter().all(|v| *v == 0.0) {
        return 0.0;
    }
    match Schur::try_new(matrix.clone(), f64::EPSILON, SCHUR_MAX_ITERATIONS) {
        Some(schur) => {
            schur.complex_eigenvalues().iter().map(|ev| ev.norm()).fold(0.0, f64::max)
        }
        None => 0.0,
    }
}

/// Estimates the dominant eigenvalue magnitude by power iteration over the
/// nonzero entries of the matrix.
///
/// An estimate is only accepted once the iterate is an eigenvector up to
/// `tolerance`, i.e. the residual `|W x -+ norm * x|` has vanished; the
/// growth factor alone can plateau at a spurious value while the iterate
/// still rotates. Returns `None` when no estimate is accepted within
/// `max_iterations`, which happens e.g. when the dominant eigenvalues form a
/// complex conjugate pair. Callers are expected to fall back to
/// [`dominant_eigenvalue`] in that case.
pub fn power_iteration(matrix: &DMatrix<f64>, max_iterations: usize, tolerance: f64) -> Option<f64> {
    let n = matrix.nrows();
    if n == 0 {
        return Some(0.0);
    }

    let mut entries: Vec<(usize, usize, f64)> = Vec::new();
    for j in 0..matrix.ncols() {
        for i in 0..n {
            let v = matrix[(i, j)];
            if v != 0.0 {
                entries.push((i, j, v));
            }
        }
    }

    let mut x = vec![1.0 / (n as f64).sqrt(); n];
    for _ in 0..max_iterations {
        let mut y = vec![0.0; n];
        for &(i, j, v) in &entries {
            y[i] += v * x[j];
        }
        let norm = y.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Some(0.0);
        }

        // residual against the eigenvalue candidates +norm and -norm
        let mut aligned = 0.0;
        let mut flipped = 0.0;
        for (yv, xv) in y.iter().zip(x.iter()) {
            aligned += (yv - norm * xv) * (yv - norm * xv);
            flipped += (yv + norm * xv) * (yv + norm * xv);
        }
        let residual = aligned.sqrt().min(flipped.sqrt());
        if residual <= tolerance * norm.max(1.0) {
            return Some(norm);
        }

        for v in y.iter_mut() {
            *v /= norm;
        }
        x = y;
    }

    None
}

#[cfg(test)]
mod tests {
    use nalgebra::DVector;

    use super::*;

    #[test]
    fn dominant_eigenvalue_diagonal() {
        let m = DMatrix::from_diagonal(&DVector::from_vec(vec![3.0, -1.0, 0.5]));
        assert!((dominant_eigenvalue(&m) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn dominant_eigenvalue_of_zero_matrix_terminates() {
        // the uncapped QR iteration would spin forever on this input
        assert_eq!(dominant_eigenvalue(&DMatrix::zeros(10, 10)), 0.0);
    }

    #[test]
    fn power_iteration_agrees_with_dense() {
        let m = DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, 1.0, 0.25]));
        let sparse = power_iteration(&m, 1_000, 1e-9).unwrap();
        assert!((sparse - dominant_eigenvalue(&m)).abs() < 1e-6);
    }

    #[test]
    fn power_iteration_negative_dominant_eigenvalue() {
        let m = DMatrix::from_diagonal(&DVector::from_vec(vec![-2.0, 1.0]));
        let estimate = power_iteration(&m, 1_000, 1e-9).unwrap();
        assert!((estimate - 2.0).abs() < 1e-6);
    }

    #[test]
    fn power_iteration_zero_matrix() {
        let m = DMatrix::zeros(4, 4);
        assert_eq!(power_iteration(&m, 100, 1e-12), Some(0.0));
    }

    #[test]
    fn power_iteration_reports_non_convergence() {
        // dominant eigenvalues are the complex pair 1 +- i*sqrt(5); the
        // growth factor plateaus near sqrt(10) while the iterate keeps
        // rotating, so no estimate may be accepted
        let m = DMatrix::from_row_slice(2, 2, &[1.0, -5.0, 1.0, 1.0]);
        assert_eq!(power_iteration(&m, 500, 1e-9), None);
    }
}
