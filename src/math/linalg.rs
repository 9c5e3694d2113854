//! Small dense linear-algebra primitives shared by both solvers.
//!
//! Every function is pure and allocates its output. Storage and the BLAS-like
//! kernels come from `nalgebra`; what this module adds is shape checking with
//! typed errors and an upper-triangular back-substitution that can be tested on
//! its own.

use nalgebra::{DMatrix, DVector, Dyn, Matrix, Storage, U1};

use crate::error::SolveError;

/// `A · B`.
pub fn matmul(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>, SolveError> {
    if a.ncols() != b.nrows() {
        return Err(SolveError::DimensionMismatch(format!(
            "cannot multiply {}x{} by {}x{}",
            a.nrows(),
            a.ncols(),
            b.nrows(),
            b.ncols()
        )));
    }
    Ok(a * b)
}

/// `Aᵗ`.
pub fn transpose(a: &DMatrix<f64>) -> DMatrix<f64> {
    a.transpose()
}

/// `A · v`.
pub fn mat_vec(a: &DMatrix<f64>, v: &DVector<f64>) -> Result<DVector<f64>, SolveError> {
    if a.ncols() != v.len() {
        return Err(SolveError::DimensionMismatch(format!(
            "cannot multiply {}x{} matrix by vector of length {}",
            a.nrows(),
            a.ncols(),
            v.len()
        )));
    }
    Ok(a * v)
}

/// `Aᵗ · v`, without materializing the transpose.
pub fn tr_mat_vec(a: &DMatrix<f64>, v: &DVector<f64>) -> Result<DVector<f64>, SolveError> {
    if a.nrows() != v.len() {
        return Err(SolveError::DimensionMismatch(format!(
            "cannot multiply transpose of {}x{} matrix by vector of length {}",
            a.nrows(),
            a.ncols(),
            v.len()
        )));
    }
    Ok(a.tr_mul(v))
}

/// Gram matrix `AᵗA` (N×N, symmetric).
pub fn gram(a: &DMatrix<f64>) -> DMatrix<f64> {
    a.tr_mul(a)
}

pub fn dot(a: &DVector<f64>, b: &DVector<f64>) -> Result<f64, SolveError> {
    if a.len() != b.len() {
        return Err(SolveError::DimensionMismatch(format!(
            "dot product of vectors with lengths {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(a.dot(b))
}

/// Euclidean norm, computed as `s · ‖v / s‖` with `s = max|v_i|`.
///
/// The plain sum of squares overflows once entries reach ~1e154 and underflows
/// below ~1e-154; the scaled form only fails when the norm itself does.
pub fn norm2<S>(v: &Matrix<f64, Dyn, U1, S>) -> f64
where
    S: Storage<f64, Dyn, U1>,
{
    let scale = v.amax();
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    scale * v.map(|x| x / scale).norm()
}

/// Solve `R x = z` for upper-triangular `R` (N×N), last row first.
///
/// `x[i] = (z[i] - Σ_{j>i} R[i][j]·x[j]) / R[i][i]`
///
/// Only the upper triangle of `r` is read. An exactly zero (or non-finite)
/// pivot fails with `RankDeficientDesignMatrix` naming that row; callers that
/// want a relative tolerance check the diagonal first.
pub fn back_substitution(r: &DMatrix<f64>, z: &DVector<f64>) -> Result<DVector<f64>, SolveError> {
    let n = r.ncols();
    if r.nrows() != n {
        return Err(SolveError::DimensionMismatch(format!(
            "back-substitution needs a square matrix, got {}x{}",
            r.nrows(),
            n
        )));
    }
    if z.len() != n {
        return Err(SolveError::DimensionMismatch(format!(
            "right-hand side has length {}, expected {n}",
            z.len()
        )));
    }

    let mut x = DVector::<f64>::zeros(n);
    for i in (0..n).rev() {
        let pivot = r[(i, i)];
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(SolveError::RankDeficientDesignMatrix {
                column: i,
                diagonal: pivot.abs(),
            });
        }
        let mut acc = z[i];
        for j in (i + 1)..n {
            acc -= r[(i, j)] * x[j];
        }
        x[i] = acc / pivot;
    }
    Ok(x)
}
