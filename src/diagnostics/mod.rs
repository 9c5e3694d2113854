//! Residuals and fit-quality diagnostics.
//!
//! Sign convention: residuals are `Xβ - y` (fitted minus observed), so a positive
//! residual means the model over-predicts that observation. SSE and RMSE do not
//! depend on the sign; `Xᵗr` only flips sign.

use nalgebra::DVector;
use serde::Serialize;

use crate::domain::{CoefficientVector, DesignMatrix, LeastSquaresFit, ObservationVector, ResidualVector};
use crate::error::SolveError;
use crate::math::{mat_vec, tr_mat_vec};

/// `Xβ - y`.
pub fn compute_residuals(
    x: &DesignMatrix,
    beta: &CoefficientVector,
    y: &ObservationVector,
) -> Result<ResidualVector, SolveError> {
    if x.nrows() != y.len() {
        return Err(SolveError::DimensionMismatch(format!(
            "design matrix has {} rows but there are {} observations",
            x.nrows(),
            y.len()
        )));
    }
    let fitted = mat_vec(x.as_matrix(), beta)?;
    Ok(fitted - y.as_vector())
}

/// Sum of squared residuals (the least-squares objective).
pub fn fit_quality(residuals: &ResidualVector) -> f64 {
    residuals.norm_squared()
}

/// Root mean squared residual; zero for an empty vector.
pub fn rmse(residuals: &ResidualVector) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    (fit_quality(residuals) / residuals.len() as f64).sqrt()
}

/// Coefficient of determination `1 - SSE/SST`, with SST taken around the mean of y.
///
/// Only meaningful as "variance explained" when the design includes an intercept
/// column. Returns `None` when y is constant (SST = 0) or the lengths differ.
pub fn r_squared(y: &ObservationVector, residuals: &ResidualVector) -> Option<f64> {
    if y.len() != residuals.len() {
        return None;
    }
    let y = y.as_vector();
    let mean = y.mean();
    let sst: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    if sst == 0.0 {
        return None;
    }
    Some(1.0 - fit_quality(residuals) / sst)
}

/// `Xᵗr`. At the least-squares optimum this is zero: the residual is orthogonal
/// to every column of X.
pub fn normal_equation_residual(
    x: &DesignMatrix,
    residuals: &ResidualVector,
) -> Result<DVector<f64>, SolveError> {
    tr_mat_vec(x.as_matrix(), residuals)
}

/// Agreement between two fits of the same problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitComparison {
    /// `max_i |β_a[i] - β_b[i]|`.
    pub max_coef_diff: f64,
    /// `max_i |β_a[i] - β_b[i]| / max(|β_a[i]|, |β_b[i]|, 1)`.
    pub max_rel_coef_diff: f64,
    /// `SSE_a - SSE_b`.
    pub sse_gap: f64,
}

pub fn compare_fits(a: &LeastSquaresFit, b: &LeastSquaresFit) -> Result<FitComparison, SolveError> {
    if a.coefficients.len() != b.coefficients.len() {
        return Err(SolveError::DimensionMismatch(format!(
            "cannot compare fits with {} and {} coefficients",
            a.coefficients.len(),
            b.coefficients.len()
        )));
    }
    let mut max_coef_diff: f64 = 0.0;
    let mut max_rel_coef_diff: f64 = 0.0;
    for (ca, cb) in a.coefficients.iter().zip(b.coefficients.iter()) {
        let d = (ca - cb).abs();
        let scale = ca.abs().max(cb.abs()).max(1.0);
        max_coef_diff = max_coef_diff.max(d);
        max_rel_coef_diff = max_rel_coef_diff.max(d / scale);
    }
    Ok(FitComparison {
        max_coef_diff,
        max_rel_coef_diff,
        sse_gap: a.sse - b.sse,
    })
}
