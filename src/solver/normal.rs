//! Normal-equations solver.
//!
//! ```text
//! β = (XᵗX)⁻¹ Xᵗy
//! ```
//!
//! The inverse is never formed: we factor the Gram matrix `G = XᵗX` with
//! Cholesky and solve `G β = Xᵗy`.
//!
//! Numerical property: `cond(XᵗX) = cond(X)²`, so this path loses roughly twice
//! as many digits as [`crate::solver::QrSolver`] on the same input. It is kept
//! because it is the textbook formula and is cheap for very tall, well-scaled
//! designs. Before solving we estimate `rcond(G) = λmin / λmax` from the
//! symmetric eigenvalues of `G` and refuse anything below
//! [`SolverConfig::gram_rcond_tol`].
//!
//! Squaring also halves the usable exponent range: entries beyond ~1e154 make
//! `XᵗX` overflow. That case is reported as [`SolveError::NumericalOverflow`],
//! not as a singular design.
//!
//! Ridge regression replaces `G` with `G + λI`
//! (`β_ridge = (XᵗX + λI)⁻¹Xᵗy`), which is always positive definite for `λ > 0`.
//! It is not offered here.

use crate::domain::{
    CoefficientVector, DesignMatrix, LeastSquaresFit, Method, ObservationVector, SolverConfig,
};
use crate::error::SolveError;
use crate::math::{gram, tr_mat_vec};
use crate::solver::{LeastSquaresSolver, assemble_fit, validate_dimensions};

/// Solves via a Cholesky factorization of `XᵗX`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalEquationsSolver {
    config: SolverConfig,
}

impl NormalEquationsSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Coefficients plus the `rcond(XᵗX)` estimate that admitted them.
    pub fn coefficients(
        &self,
        x: &DesignMatrix,
        y: &ObservationVector,
    ) -> Result<(CoefficientVector, f64), SolveError> {
        validate_dimensions(x, y)?;
        self.config.validate()?;

        let g = gram(x.as_matrix());
        let rhs = tr_mat_vec(x.as_matrix(), y.as_vector())?;
        if g.iter().chain(rhs.iter()).any(|v| !v.is_finite()) {
            return Err(SolveError::NumericalOverflow(format!(
                "XᵗX or Xᵗy is not representable (largest |X| entry {:.3e}, largest |y| entry {:.3e})",
                x.as_matrix().amax(),
                y.as_vector().amax()
            )));
        }

        let rcond = gram_rcond(&g);
        if rcond < self.config.gram_rcond_tol {
            return Err(SolveError::SingularDesignMatrix {
                condition_number: condition_number(rcond),
            });
        }

        let Some(chol) = g.cholesky() else {
            // Passed the eigenvalue screen but the factorization still broke down.
            return Err(SolveError::SingularDesignMatrix {
                condition_number: condition_number(rcond),
            });
        };
        let beta = chol.solve(&rhs);
        if beta.iter().any(|v| !v.is_finite()) {
            return Err(SolveError::SingularDesignMatrix {
                condition_number: condition_number(rcond),
            });
        }
        Ok((beta, rcond))
    }
}

impl LeastSquaresSolver for NormalEquationsSolver {
    fn method(&self) -> Method {
        Method::NormalEquations
    }

    fn solve(&self, x: &DesignMatrix, y: &ObservationVector) -> Result<LeastSquaresFit, SolveError> {
        let (beta, rcond) = self.coefficients(x, y)?;
        assemble_fit(self.method(), x, y, beta, rcond)
    }
}

/// `λmin / λmax` of a symmetric matrix, clamped to `[0, 1]`.
///
/// Zero means singular (or indefinite through rounding).
pub fn gram_rcond(g: &nalgebra::DMatrix<f64>) -> f64 {
    let eig = g.symmetric_eigenvalues();
    let max = eig.max();
    let min = eig.min();
    if max.is_nan() || max <= 0.0 || !min.is_finite() {
        return 0.0;
    }
    (min / max).clamp(0.0, 1.0)
}

fn condition_number(rcond: f64) -> f64 {
    if rcond > 0.0 { 1.0 / rcond } else { f64::INFINITY }
}
