//! Linear algebra utilities
//!
//! Numerical guards for covariance matrices used by the Kalman filter.

use nalgebra::DMatrix;

/// Make matrix symmetric
///
/// Ensures a matrix is symmetric by averaging with its transpose.
/// Floating-point error accumulated over many predict/update cycles can
/// otherwise drift a covariance away from exact symmetry.
pub fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    0.5 * (matrix + matrix.transpose())
}

/// Check if a symmetric matrix is positive semi-definite
///
/// All eigenvalues must be non-negative within the given tolerance.
pub fn is_positive_semidefinite(matrix: &DMatrix<f64>, tol: f64) -> bool {
    matrix
        .clone()
        .symmetric_eigenvalues()
        .iter()
        .all(|&e| e >= -tol)
}

/// Maximum absolute asymmetry |M - Mᵀ| over all entries
pub fn max_asymmetry(matrix: &DMatrix<f64>) -> f64 {
    let diff = matrix - matrix.transpose();
    diff.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}
