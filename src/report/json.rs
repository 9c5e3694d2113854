//! JSON export of solve results.
//!
//! The schema is plain vectors and numbers so it can be loaded by anything; the
//! `nalgebra` types are flattened on the way out.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::{MethodOutcome, ProblemRun};
use crate::diagnostics::FitComparison;
use crate::domain::{Method, SolverConfig};
use crate::error::AppError;

/// Top-level JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub tool: String,
    pub config: SolverConfig,
    pub problems: Vec<ProblemReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProblemReport {
    pub label: String,
    pub rows: usize,
    pub cols: usize,
    pub fits: Vec<FitReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<FitComparison>,
}

/// One method's outcome; exactly one of `coefficients` / `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub method: Method,
    /// Relative error in β grows like `cond(X)` to this power.
    pub condition_exponent: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residuals: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rcond_estimate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&MethodOutcome> for FitReport {
    fn from(outcome: &MethodOutcome) -> Self {
        match &outcome.result {
            Ok(fit) => FitReport {
                method: outcome.method,
                condition_exponent: outcome.method.condition_exponent(),
                coefficients: Some(fit.coefficients.iter().copied().collect()),
                residuals: Some(fit.residuals.iter().copied().collect()),
                sse: Some(fit.sse),
                rmse: Some(fit.rmse),
                r_squared: outcome.r_squared,
                rcond_estimate: Some(fit.rcond_estimate),
                error: None,
            },
            Err(err) => FitReport {
                method: outcome.method,
                condition_exponent: outcome.method.condition_exponent(),
                coefficients: None,
                residuals: None,
                sse: None,
                rmse: None,
                r_squared: None,
                rcond_estimate: None,
                error: Some(err.to_string()),
            },
        }
    }
}

impl From<&ProblemRun> for ProblemReport {
    fn from(run: &ProblemRun) -> Self {
        ProblemReport {
            label: run.label.clone(),
            rows: run.problem.design.nrows(),
            cols: run.problem.design.ncols(),
            fits: run.outcomes.iter().map(FitReport::from).collect(),
            comparison: run.comparison,
        }
    }
}

/// Build the JSON document for a set of runs.
pub fn build_report(runs: &[ProblemRun], config: &SolverConfig) -> Report {
    Report {
        tool: "linfit".to_string(),
        config: *config,
        problems: runs.iter().map(ProblemReport::from).collect(),
    }
}

/// Write a pretty-printed JSON report.
pub fn write_report_json(path: &Path, runs: &[ProblemRun], config: &SolverConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &build_report(runs, config))
        .map_err(|e| AppError::new(4, format!("Failed to write report JSON: {e}")))?;

    Ok(())
}
