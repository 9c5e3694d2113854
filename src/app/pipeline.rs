//! Shared "solve pipeline" logic used by every CLI command.
//!
//! problem(s) -> solve with each requested method -> diagnostics -> comparison
//!
//! Commands then only decide where problems come from and how results are shown.

use crate::diagnostics::{FitComparison, compare_fits, r_squared};
use crate::domain::{LeastSquaresFit, LeastSquaresProblem, Method, SolverConfig};
use crate::error::SolveError;
use crate::solver::solve_batch;

/// Outcome of one method on one problem.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOutcome {
    pub method: Method,
    pub result: Result<LeastSquaresFit, SolveError>,
    pub r_squared: Option<f64>,
}

/// All computed outputs for a single problem.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemRun {
    pub label: String,
    pub problem: LeastSquaresProblem,
    pub outcomes: Vec<MethodOutcome>,
    /// Present when exactly two methods ran and both succeeded.
    pub comparison: Option<FitComparison>,
}

impl ProblemRun {
    pub fn failures(&self) -> impl Iterator<Item = (Method, &SolveError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.method, e)))
    }
}

/// Solve one problem with each method.
pub fn run_problem(
    label: impl Into<String>,
    problem: LeastSquaresProblem,
    methods: &[Method],
    config: &SolverConfig,
) -> ProblemRun {
    let mut runs = run_batch(vec![(label.into(), problem)], methods, config);
    // run_batch returns exactly one run per input.
    runs.swap_remove(0)
}

/// Solve many problems; each method is fanned out over the rayon pool.
pub fn run_batch(
    labelled: Vec<(String, LeastSquaresProblem)>,
    methods: &[Method],
    config: &SolverConfig,
) -> Vec<ProblemRun> {
    let (labels, problems): (Vec<String>, Vec<LeastSquaresProblem>) = labelled.into_iter().unzip();

    let per_method: Vec<(Method, Vec<Result<LeastSquaresFit, SolveError>>)> = methods
        .iter()
        .map(|&m| (m, solve_batch(&problems, m, config)))
        .collect();

    let mut runs: Vec<ProblemRun> = labels
        .into_iter()
        .zip(problems)
        .map(|(label, problem)| ProblemRun {
            label,
            problem,
            outcomes: Vec::with_capacity(methods.len()),
            comparison: None,
        })
        .collect();

    for (method, results) in per_method {
        for (run, result) in runs.iter_mut().zip(results) {
            let r2 = result
                .as_ref()
                .ok()
                .and_then(|fit| r_squared(&run.problem.observations, &fit.residuals));
            run.outcomes.push(MethodOutcome {
                method,
                result,
                r_squared: r2,
            });
        }
    }

    for run in &mut runs {
        if let [a, b] = run.outcomes.as_slice()
            && let (Ok(fa), Ok(fb)) = (&a.result, &b.result)
        {
            run.comparison = compare_fits(fa, fb).ok();
        }
    }

    runs
}
