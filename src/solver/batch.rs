//! Parallel solves over independent problems.
//!
//! Solves share no state, so each problem is handed to the rayon pool as-is.
//! Output order matches input order and one failure does not affect the others.

use rayon::prelude::*;

use crate::domain::{LeastSquaresFit, LeastSquaresProblem, Method, SolverConfig};
use crate::error::SolveError;
use crate::solver::solve;

/// Solve every problem with the same method and tolerances (parallel).
pub fn solve_batch(
    problems: &[LeastSquaresProblem],
    method: Method,
    config: &SolverConfig,
) -> Vec<Result<LeastSquaresFit, SolveError>> {
    problems
        .par_iter()
        .map(|p| solve(method, &p.design, &p.observations, config))
        .collect()
}
