//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the log subscriber
//! - builds problems (worked example or synthetic)
//! - runs the requested solvers
//! - prints reports and writes optional JSON

use clap::Parser;
use tracing::info;

use crate::cli::{Command, ExampleArgs, SolverArgs, SyntheticArgs};
use crate::data::{WORKED_EXAMPLE_LABELS, synthetic_batch, worked_example};
use crate::domain::SolverConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `linfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    // Logs go to stderr so stdout stays clean for reports.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Example(args) => handle_example(args),
        Command::Synthetic(args) => handle_synthetic(args),
    }
}

fn handle_example(args: ExampleArgs) -> Result<(), AppError> {
    let config = solver_config_from_args(&args.solver)?;
    let problem = worked_example()?;

    let run = pipeline::run_problem("worked example", problem, &args.solver.method.methods(), &config);
    println!(
        "{}",
        crate::report::format_run(&run, Some(&WORKED_EXAMPLE_LABELS[..]))
    );

    let runs = [run];
    if let Some(path) = &args.solver.json {
        crate::report::write_report_json(path, &runs, &config)?;
        info!(path = %path.display(), "report written");
    }
    exit_on_failures(&runs)
}

fn handle_synthetic(args: SyntheticArgs) -> Result<(), AppError> {
    let config = solver_config_from_args(&args.solver)?;
    if args.count == 0 {
        return Err(AppError::new(2, "Problem count must be > 0."));
    }

    let problems = synthetic_batch(args.count, args.rows, args.cols, args.noise, args.seed)?;
    info!(
        count = problems.len(),
        rows = args.rows,
        cols = args.cols,
        noise = args.noise,
        "generated synthetic problems"
    );

    let labelled = problems
        .into_iter()
        .map(|p| (format!("seed {}", p.seed), p.problem))
        .collect();
    let runs = pipeline::run_batch(labelled, &args.solver.method.methods(), &config);

    if let [run] = runs.as_slice() {
        println!("{}", crate::report::format_run(run, None));
    } else {
        println!("{}", crate::report::format_batch_summary(&runs));
    }

    if let Some(path) = &args.solver.json {
        crate::report::write_report_json(path, &runs, &config)?;
        info!(path = %path.display(), "report written");
    }
    exit_on_failures(&runs)
}

/// Map CLI flags onto validated solver tolerances.
pub fn solver_config_from_args(args: &SolverArgs) -> Result<SolverConfig, AppError> {
    let config = SolverConfig::default()
        .with_gram_rcond_tol(args.rcond_tol)
        .with_rank_tol(args.rank_tol);
    config.validate()?;
    Ok(config)
}

/// Reports are printed either way; a failed solve still sets a non-zero exit code.
fn exit_on_failures(runs: &[pipeline::ProblemRun]) -> Result<(), AppError> {
    let failed = runs.iter().flat_map(|r| r.failures()).next();
    match failed {
        Some((method, err)) => {
            let total: usize = runs.iter().map(|r| r.failures().count()).sum();
            let mut app = AppError::from(err.clone());
            if total > 1 {
                app = AppError::new(
                    app.exit_code(),
                    format!("{total} solves failed; first ({}): {err}", method.display_name()),
                );
            }
            Err(app)
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::MethodChoice;
    use crate::domain::Method;

    fn solver_args() -> SolverArgs {
        SolverArgs {
            method: MethodChoice::Both,
            rcond_tol: 1e-12,
            rank_tol: 1e-10,
            json: None,
        }
    }

    #[test]
    fn config_from_args_validates_tolerances() {
        assert!(solver_config_from_args(&solver_args()).is_ok());

        let bad = SolverArgs {
            rank_tol: 2.0,
            ..solver_args()
        };
        let err = solver_config_from_args(&bad).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn failures_become_exit_codes() {
        let cfg = SolverConfig::default().with_gram_rcond_tol(1e-6);
        let run = pipeline::run_problem("w", worked_example().unwrap(), &Method::ALL, &cfg);
        let err = exit_on_failures(&[run]).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let ok = pipeline::run_problem("w", worked_example().unwrap(), &Method::ALL, &SolverConfig::default());
        assert!(exit_on_failures(&[ok]).is_ok());
    }
}
