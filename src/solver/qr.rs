//! QR solver.
//!
//! ```text
//! X = QR   (thin Householder factorization)
//! Rβ = Qᵗy (back-substitution)
//! ```
//!
//! `XᵗX` is never formed, so the achievable accuracy is governed by `cond(X)`
//! rather than `cond(X)²`. This is the preferred path; the normal-equations
//! solver is kept for comparison and for the textbook formula.
//!
//! Rank detection: without column pivoting a dependent column shows up as a tiny
//! `R[k][k]` at the first column k that lies (numerically) in the span of the
//! columns before it. We compare against `rank_tol · max_j ‖X[:, j]‖₂` so the
//! threshold follows the scale of the data.

use crate::domain::{
    CoefficientVector, DesignMatrix, LeastSquaresFit, Method, ObservationVector, SolverConfig,
};
use crate::error::SolveError;
use crate::math::{QrFactorization, back_substitution, householder_qr, norm2};
use crate::solver::{LeastSquaresSolver, assemble_fit, validate_dimensions};

/// Solves via Householder QR and back-substitution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QrSolver {
    config: SolverConfig,
}

impl QrSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Factorize `x` and check `R` for numerically zero pivots.
    pub fn factorize(&self, x: &DesignMatrix) -> Result<QrFactorization, SolveError> {
        self.config.validate()?;
        let qr = householder_qr(x.as_matrix())?;

        let scale = x
            .as_matrix()
            .column_iter()
            .map(|c| norm2(&c))
            .fold(0.0_f64, f64::max);
        let threshold = self.config.rank_tol * scale;

        for (column, d) in qr.abs_diagonal().iter().copied().enumerate() {
            if d <= threshold || !d.is_finite() {
                return Err(SolveError::RankDeficientDesignMatrix {
                    column,
                    diagonal: d,
                });
            }
        }
        Ok(qr)
    }

    /// Coefficients plus `min|R_kk| / max|R_kk|`.
    pub fn coefficients(
        &self,
        x: &DesignMatrix,
        y: &ObservationVector,
    ) -> Result<(CoefficientVector, f64), SolveError> {
        validate_dimensions(x, y)?;
        let qr = self.factorize(x)?;

        let z = qr.qt_mul(y.as_vector())?;
        let beta = back_substitution(qr.r(), &z)?;

        let diag = qr.abs_diagonal();
        let rcond = diag.min() / diag.max();
        Ok((beta, rcond))
    }
}

impl LeastSquaresSolver for QrSolver {
    fn method(&self) -> Method {
        Method::Qr
    }

    fn solve(&self, x: &DesignMatrix, y: &ObservationVector) -> Result<LeastSquaresFit, SolveError> {
        let (beta, rcond) = self.coefficients(x, y)?;
        assemble_fit(self.method(), x, y, beta, rcond)
    }
}
