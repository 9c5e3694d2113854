//! Least-squares solvers.
//!
//! Two independent algorithms behind one trait:
//!
//! - [`NormalEquationsSolver`]: Cholesky on `XᵗX`. Squares the condition number.
//! - [`QrSolver`]: Householder QR + back-substitution. Preferred.
//!
//! Both are pure: each call allocates its own intermediates and returns either a
//! full [`LeastSquaresFit`] or a typed [`SolveError`], never a partial β.
//! [`solve_batch`] runs many independent problems in parallel.

use tracing::{debug, warn};

use crate::diagnostics::{compute_residuals, fit_quality, rmse};
use crate::domain::{
    CoefficientVector, DesignMatrix, LeastSquaresFit, Method, ObservationVector, SolverConfig,
};
use crate::error::SolveError;

pub mod batch;
pub mod normal;
pub mod qr;

pub use batch::*;
pub use normal::*;
pub use qr::*;

/// Common interface of the two solvers.
pub trait LeastSquaresSolver {
    fn method(&self) -> Method;

    /// Relative error in β grows like `cond(X)` raised to this power.
    fn condition_exponent(&self) -> u32 {
        self.method().condition_exponent()
    }

    fn solve(&self, x: &DesignMatrix, y: &ObservationVector) -> Result<LeastSquaresFit, SolveError>;
}

/// Solver instance for `method`.
pub fn solver_for(method: Method, config: SolverConfig) -> Box<dyn LeastSquaresSolver + Send + Sync> {
    match method {
        Method::NormalEquations => Box::new(NormalEquationsSolver::new(config)),
        Method::Qr => Box::new(QrSolver::new(config)),
    }
}

/// Solve with the chosen method and tolerances.
pub fn solve(
    method: Method,
    x: &DesignMatrix,
    y: &ObservationVector,
    config: &SolverConfig,
) -> Result<LeastSquaresFit, SolveError> {
    debug!(
        method = method.display_name(),
        rows = x.nrows(),
        cols = x.ncols(),
        "solving least squares"
    );
    let result = solver_for(method, *config).solve(x, y);
    match &result {
        Ok(fit) => debug!(
            method = method.display_name(),
            sse = fit.sse,
            rcond = fit.rcond_estimate,
            "solve complete"
        ),
        Err(err) if err.is_numerical() => {
            warn!(method = method.display_name(), error = %err, "solve failed")
        }
        Err(err) => debug!(method = method.display_name(), error = %err, "input rejected"),
    }
    result
}

/// `β = (XᵗX)⁻¹Xᵗy` with default tolerances.
pub fn solve_normal_equations(
    x: &DesignMatrix,
    y: &ObservationVector,
) -> Result<CoefficientVector, SolveError> {
    solve(Method::NormalEquations, x, y, &SolverConfig::default()).map(|fit| fit.coefficients)
}

/// β from `Rβ = Qᵗy` with default tolerances.
pub fn solve_qr(x: &DesignMatrix, y: &ObservationVector) -> Result<CoefficientVector, SolveError> {
    solve(Method::Qr, x, y, &SolverConfig::default()).map(|fit| fit.coefficients)
}

/// Shape preconditions shared by both solvers, checked before any arithmetic.
pub fn validate_dimensions(x: &DesignMatrix, y: &ObservationVector) -> Result<(), SolveError> {
    if x.nrows() != y.len() {
        return Err(SolveError::DimensionMismatch(format!(
            "design matrix has {} rows but there are {} observations",
            x.nrows(),
            y.len()
        )));
    }
    if x.ncols() > x.nrows() {
        return Err(SolveError::DimensionMismatch(format!(
            "under-determined system: {} regressors for {} observations",
            x.ncols(),
            x.nrows()
        )));
    }
    Ok(())
}

pub(crate) fn assemble_fit(
    method: Method,
    x: &DesignMatrix,
    y: &ObservationVector,
    coefficients: CoefficientVector,
    rcond_estimate: f64,
) -> Result<LeastSquaresFit, SolveError> {
    let residuals = compute_residuals(x, &coefficients, y)?;
    let sse = fit_quality(&residuals);
    let rmse = rmse(&residuals);
    Ok(LeastSquaresFit {
        method,
        coefficients,
        residuals,
        sse,
        rmse,
        rcond_estimate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{synthetic_problem, worked_example};
    use crate::diagnostics::normal_equation_residual;
    use approx::assert_relative_eq;

    const WORKED_BETA: [f64; 3] = [276.8560405561564, 1.5165318522384175, -1.1871621873485687];

    #[test]
    fn worked_example_both_methods_agree() {
        let p = worked_example().unwrap();
        let beta_ne = solve_normal_equations(&p.design, &p.observations).unwrap();
        let beta_qr = solve_qr(&p.design, &p.observations).unwrap();

        for i in 0..3 {
            assert_relative_eq!(beta_ne[i], beta_qr[i], max_relative = 1e-8);
            assert_relative_eq!(beta_qr[i], WORKED_BETA[i], max_relative = 1e-9);
        }
    }

    #[test]
    fn worked_example_objective_value() {
        let p = worked_example().unwrap();
        for method in Method::ALL {
            let fit = solve(method, &p.design, &p.observations, &SolverConfig::default()).unwrap();
            assert_relative_eq!(fit.sse, 7.923062586200361, max_relative = 1e-8);
            assert_eq!(fit.residuals.len(), 4);
        }
    }

    #[test]
    fn random_full_rank_problems_agree() {
        for seed in 0..20 {
            let p = synthetic_problem(30, 4, 0.5, seed).unwrap();
            let a = solve_normal_equations(&p.problem.design, &p.problem.observations).unwrap();
            let b = solve_qr(&p.problem.design, &p.problem.observations).unwrap();
            for i in 0..4 {
                assert_relative_eq!(a[i], b[i], epsilon = 1e-10, max_relative = 1e-8);
            }
        }
    }

    #[test]
    fn qr_residual_is_orthogonal_to_columns() {
        for seed in [3, 7, 11] {
            let p = synthetic_problem(25, 5, 1.0, seed).unwrap();
            let cfg = SolverConfig::default();
            let fit = solve(Method::Qr, &p.problem.design, &p.problem.observations, &cfg).unwrap();
            let g = normal_equation_residual(&p.problem.design, &fit.residuals).unwrap();
            let scale = p.problem.observations.as_vector().amax().max(1.0);
            assert!(g.amax() < 1e-9 * scale * 25.0, "Xᵗr = {g}");
        }
    }

    #[test]
    fn perturbing_beta_never_lowers_sse() {
        let p = worked_example().unwrap();
        let fit = solve(Method::Qr, &p.design, &p.observations, &SolverConfig::default()).unwrap();

        for i in 0..3 {
            for delta in [-1e-3, 1e-3, -0.5, 0.5] {
                let mut beta = fit.coefficients.clone();
                beta[i] += delta;
                let r = compute_residuals(&p.design, &beta, &p.observations).unwrap();
                assert!(
                    fit_quality(&r) >= fit.sse,
                    "coefficient {i} perturbed by {delta} lowered SSE"
                );
            }
        }
    }

    #[test]
    fn exact_fit_recovers_true_coefficients() {
        for seed in [1, 2, 5] {
            let p = synthetic_problem(12, 3, 0.0, seed).unwrap();
            for method in Method::ALL {
                let fit = solve(
                    method,
                    &p.problem.design,
                    &p.problem.observations,
                    &SolverConfig::default(),
                )
                .unwrap();
                for i in 0..3 {
                    assert_relative_eq!(
                        fit.coefficients[i],
                        p.beta_true[i],
                        epsilon = 1e-9,
                        max_relative = 1e-9
                    );
                }
                assert!(fit.residuals.amax() < 1e-9);
            }
        }
    }

    #[test]
    fn duplicated_column_fails_for_both_methods() {
        let p = worked_example().unwrap();
        // Append a copy of the weight column.
        let x = p.design.as_matrix();
        let mut dup = x.clone().insert_column(3, 0.0);
        dup.set_column(3, &x.column(1));
        let dup = DesignMatrix::new(dup).unwrap();

        assert!(matches!(
            solve_normal_equations(&dup, &p.observations),
            Err(SolveError::SingularDesignMatrix { .. })
        ));
        assert!(matches!(
            solve_qr(&dup, &p.observations),
            Err(SolveError::RankDeficientDesignMatrix { column: 3, .. })
        ));
    }

    #[test]
    fn mismatched_rows_fail_before_numerics() {
        let p = worked_example().unwrap();
        let y = ObservationVector::from_slice(&[1.0, 2.0, 3.0]).unwrap();
        for method in Method::ALL {
            assert!(matches!(
                solve(method, &p.design, &y, &SolverConfig::default()),
                Err(SolveError::DimensionMismatch(_))
            ));
        }
    }

    #[test]
    fn under_determined_is_a_dimension_mismatch() {
        let x = DesignMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let y = ObservationVector::from_slice(&[1.0, 2.0]).unwrap();
        assert!(matches!(
            solve_qr(&x, &y),
            Err(SolveError::DimensionMismatch(_))
        ));
        assert!(matches!(
            solve_normal_equations(&x, &y),
            Err(SolveError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn solver_for_dispatches_on_method() {
        for method in Method::ALL {
            assert_eq!(solver_for(method, SolverConfig::default()).method(), method);
        }
    }

    #[test]
    fn solvers_expose_their_condition_exponent() {
        let cfg = SolverConfig::default();
        assert_eq!(NormalEquationsSolver::new(cfg).condition_exponent(), 2);
        assert_eq!(QrSolver::new(cfg).condition_exponent(), 1);
        assert_eq!(solver_for(Method::Qr, cfg).condition_exponent(), 1);
    }

    #[test]
    fn huge_well_conditioned_design_solves_with_qr_only() {
        let data: Vec<f64> = [1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]
            .iter()
            .map(|v| v * 1e160)
            .collect();
        let x = DesignMatrix::from_row_slice(4, 2, &data).unwrap();
        let y = ObservationVector::from_slice(&[1e160, 3e160, 5e160, 7e160]).unwrap();

        let beta = solve_qr(&x, &y).unwrap();
        assert_relative_eq!(beta[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(beta[1], 2.0, epsilon = 1e-10);
        assert!(matches!(
            solve_normal_equations(&x, &y),
            Err(SolveError::NumericalOverflow(_))
        ));
    }
}
