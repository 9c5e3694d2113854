//! Thin Householder QR factorization.
//!
//! For an M×N matrix `X` with `M >= N` we compute
//!
//! ```text
//! X = Q R,   Q: M×N with QᵗQ = I,   R: N×N upper triangular
//! ```
//!
//! Column k is reduced by a reflector `H_k = I - β v vᵗ` acting on rows `k..M`.
//! For the sub-column `x = X[k.., k]` we take
//!
//! ```text
//! v = x + sign(x₀)‖x‖ e₁,   β = 2 / vᵗv,   H_k x = -sign(x₀)‖x‖ e₁
//! ```
//!
//! Adding `sign(x₀)‖x‖` to `x₀` (rather than subtracting) keeps `v₀` away from
//! cancellation when `x` is nearly parallel to `e₁`.
//!
//! `Q` is accumulated explicitly as `H₀ H₁ … H_{N-1} [I; 0]`, which keeps the
//! public result easy to inspect. The reflectors are kept too so `Qᵗy` can be
//! applied without touching `Q`.

use nalgebra::{DMatrix, DVector};

use crate::error::SolveError;
use crate::math::norm2;

/// A single Householder reflector `I - β v vᵗ` acting on rows `offset..`.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholderReflector {
    offset: usize,
    v: DVector<f64>,
    beta: f64,
}

impl HouseholderReflector {
    /// Build the reflector mapping `x` onto a multiple of `e₁`.
    ///
    /// Returns `None` when `x` is identically zero (nothing to annihilate).
    pub fn new(offset: usize, x: &DVector<f64>) -> Option<Self> {
        if x.is_empty() {
            return None;
        }
        let norm = norm2(x);
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        let sign = if x[0] >= 0.0 { 1.0 } else { -1.0 };
        let mut v = x.clone();
        v[0] += sign * norm;
        // H depends only on the direction of v; unit max-entry keeps vᵗv in [1, len].
        let scale = v.amax();
        v /= scale;
        let vtv = v.norm_squared();
        Some(Self {
            offset,
            v,
            beta: 2.0 / vtv,
        })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Apply in place to columns `cols` of `a` (rows `offset..` are touched).
    pub fn apply_to_columns(&self, a: &mut DMatrix<f64>, cols: std::ops::Range<usize>) {
        let k = self.offset;
        for j in cols {
            let mut s = 0.0;
            for (i, vi) in self.v.iter().enumerate() {
                s += vi * a[(k + i, j)];
            }
            s *= self.beta;
            for (i, vi) in self.v.iter().enumerate() {
                a[(k + i, j)] -= s * vi;
            }
        }
    }

    /// Apply in place to a vector.
    pub fn apply_to_vector(&self, y: &mut DVector<f64>) {
        let k = self.offset;
        let mut s = 0.0;
        for (i, vi) in self.v.iter().enumerate() {
            s += vi * y[k + i];
        }
        s *= self.beta;
        for (i, vi) in self.v.iter().enumerate() {
            y[k + i] -= s * vi;
        }
    }
}

/// Result of [`householder_qr`]. Scoped to a single solve; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QrFactorization {
    q: DMatrix<f64>,
    r: DMatrix<f64>,
    reflectors: Vec<HouseholderReflector>,
}

impl QrFactorization {
    /// M×N factor with orthonormal columns.
    pub fn q(&self) -> &DMatrix<f64> {
        &self.q
    }

    /// N×N upper-triangular factor.
    pub fn r(&self) -> &DMatrix<f64> {
        &self.r
    }

    pub fn reflectors(&self) -> &[HouseholderReflector] {
        &self.reflectors
    }

    /// `Qᵗy` (length N), computed by applying the reflectors to `y`.
    pub fn qt_mul(&self, y: &DVector<f64>) -> Result<DVector<f64>, SolveError> {
        if y.len() != self.q.nrows() {
            return Err(SolveError::DimensionMismatch(format!(
                "Qᵗy needs a vector of length {}, got {}",
                self.q.nrows(),
                y.len()
            )));
        }
        let mut z = y.clone();
        for h in &self.reflectors {
            h.apply_to_vector(&mut z);
        }
        Ok(z.rows(0, self.r.nrows()).into_owned())
    }

    /// `QR`, which should reproduce the factorized matrix.
    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.q * &self.r
    }

    /// Absolute values of the diagonal of `R`.
    pub fn abs_diagonal(&self) -> DVector<f64> {
        self.r.diagonal().abs()
    }
}

/// Factorize `x` (M×N, `M >= N`) into thin `Q` and `R`.
pub fn householder_qr(x: &DMatrix<f64>) -> Result<QrFactorization, SolveError> {
    let (m, n) = x.shape();
    if n == 0 || m < n {
        return Err(SolveError::DimensionMismatch(format!(
            "QR needs at least as many rows as columns (and at least one column), got {m}x{n}"
        )));
    }

    let mut a = x.clone();
    let mut reflectors = Vec::with_capacity(n);

    for k in 0..n {
        let col: DVector<f64> = a.view((k, k), (m - k, 1)).column(0).into_owned();
        let Some(h) = HouseholderReflector::new(k, &col) else {
            // Column already zero on and below the diagonal: R[k][k] = 0.
            continue;
        };
        h.apply_to_columns(&mut a, k..n);
        // Exact zeros below the pivot (the reflector only gets them to rounding).
        for i in (k + 1)..m {
            a[(i, k)] = 0.0;
        }
        reflectors.push(h);
    }

    let r = a.view((0, 0), (n, n)).upper_triangle();

    let mut q = DMatrix::<f64>::identity(m, n);
    for h in reflectors.iter().rev() {
        h.apply_to_columns(&mut q, 0..n);
    }

    Ok(QrFactorization { q, r, reflectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn worked_x() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            4,
            3,
            &[
                1.0, 70.0, 177.0, //
                1.0, 86.0, 190.0, //
                1.0, 63.0, 180.0, //
                1.0, 62.0, 172.0,
            ],
        )
    }

    #[test]
    fn reflector_maps_vector_onto_first_axis() {
        let x = DVector::from_column_slice(&[3.0, 4.0, 0.0]);
        let h = HouseholderReflector::new(0, &x).unwrap();
        let mut y = x.clone();
        h.apply_to_vector(&mut y);
        // Positive pivot, so the image is -‖x‖ e₁.
        assert_abs_diff_eq!(y[0], -5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn reflector_sign_avoids_cancellation() {
        // x nearly parallel to -e₁: v₀ = x₀ - ‖x‖ would cancel, x₀ + sign(x₀)‖x‖ does not.
        let x = DVector::from_column_slice(&[-1.0, 1e-9]);
        let h = HouseholderReflector::new(0, &x).unwrap();
        let mut y = x.clone();
        h.apply_to_vector(&mut y);
        assert_abs_diff_eq!(y[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y[1], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn reflector_handles_huge_entries() {
        let x = DVector::from_column_slice(&[3e200, 4e200]);
        let h = HouseholderReflector::new(0, &x).unwrap();
        let mut y = x.clone();
        h.apply_to_vector(&mut y);
        assert_relative_eq!(y[0], -5e200, max_relative = 1e-14);
        assert!(y[1].abs() < 1e186, "y[1] = {}", y[1]);
    }

    #[test]
    fn qr_of_uniformly_scaled_matrix_scales_r() {
        let base = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let big = &base * 1e160;
        let qr = householder_qr(&big).unwrap();
        let small = householder_qr(&base).unwrap();
        for k in 0..2 {
            assert_relative_eq!(
                qr.abs_diagonal()[k],
                small.abs_diagonal()[k] * 1e160,
                max_relative = 1e-12
            );
        }
        let qtq = qr.q().tr_mul(qr.q());
        assert!((qtq - DMatrix::<f64>::identity(2, 2)).amax() < 1e-12);
    }

    #[test]
    fn zero_vector_has_no_reflector() {
        assert!(HouseholderReflector::new(0, &DVector::zeros(3)).is_none());
    }

    #[test]
    fn qr_reconstructs_input() {
        let x = worked_x();
        let qr = householder_qr(&x).unwrap();
        assert_eq!(qr.q().shape(), (4, 3));
        assert_eq!(qr.r().shape(), (3, 3));

        let diff = qr.reconstruct() - &x;
        assert!(diff.amax() < 1e-10, "max |QR - X| = {}", diff.amax());
    }

    #[test]
    fn q_has_orthonormal_columns() {
        let qr = householder_qr(&worked_x()).unwrap();
        let qtq = qr.q().tr_mul(qr.q());
        let diff = qtq - DMatrix::<f64>::identity(3, 3);
        assert!(diff.amax() < 1e-12, "max |QᵗQ - I| = {}", diff.amax());
    }

    #[test]
    fn r_is_upper_triangular() {
        let qr = householder_qr(&worked_x()).unwrap();
        let r = qr.r();
        for i in 0..3 {
            for j in 0..i {
                assert_eq!(r[(i, j)], 0.0);
            }
        }
        // First column is all ones, so |R[0][0]| = sqrt(4).
        assert_abs_diff_eq!(qr.abs_diagonal()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn qt_mul_matches_explicit_q() {
        let qr = householder_qr(&worked_x()).unwrap();
        let y = DVector::from_column_slice(&[175.0, 181.0, 159.0, 165.0]);
        let implicit = qr.qt_mul(&y).unwrap();
        let explicit = qr.q().tr_mul(&y);
        assert_eq!(implicit.len(), 3);
        assert!((implicit - explicit).amax() < 1e-10);
        assert!(qr.qt_mul(&DVector::zeros(3)).is_err());
    }

    #[test]
    fn zero_column_leaves_zero_pivot() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        let qr = householder_qr(&x).unwrap();
        assert_eq!(qr.r()[(1, 1)], 0.0);
        assert_eq!(qr.reflectors().len(), 1);
        assert_eq!(qr.reflectors()[0].offset(), 0);
        assert!((qr.reconstruct() - &x).amax() < 1e-12);
    }

    #[test]
    fn wide_matrix_is_rejected() {
        let x = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(
            householder_qr(&x),
            Err(SolveError::DimensionMismatch(_))
        ));
    }
}
