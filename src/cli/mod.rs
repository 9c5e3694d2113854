//! Command-line parsing for the least-squares solver.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! numerical code; `app` turns these structs into a `SolverConfig` and runs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{DEFAULT_GRAM_RCOND_TOL, DEFAULT_RANK_TOL, Method};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "linfit", version, about = "Least-squares solver: normal equations vs Householder QR")]
pub struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve the built-in four-row height/weight example.
    Example(ExampleArgs),
    /// Generate seeded random problems and solve them (in parallel).
    Synthetic(SyntheticArgs),
}

/// Which solver(s) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodChoice {
    Normal,
    Qr,
    /// Run both and report how closely they agree.
    Both,
}

impl MethodChoice {
    pub fn methods(self) -> Vec<Method> {
        match self {
            MethodChoice::Normal => vec![Method::NormalEquations],
            MethodChoice::Qr => vec![Method::Qr],
            MethodChoice::Both => Method::ALL.to_vec(),
        }
    }
}

/// Solver options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct SolverArgs {
    /// Solver(s) to run.
    #[arg(short = 'm', long, value_enum, default_value_t = MethodChoice::Both)]
    pub method: MethodChoice,

    /// Minimum reciprocal condition number of XᵗX for the normal equations.
    #[arg(long, default_value_t = DEFAULT_GRAM_RCOND_TOL)]
    pub rcond_tol: f64,

    /// Relative threshold on |R[k][k]| (scaled by the largest column norm) for QR.
    #[arg(long, default_value_t = DEFAULT_RANK_TOL)]
    pub rank_tol: f64,

    /// Write a JSON report to this path.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ExampleArgs {
    #[command(flatten)]
    pub solver: SolverArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SyntheticArgs {
    /// Observations per problem (M).
    #[arg(short = 'r', long, default_value_t = 50)]
    pub rows: usize,

    /// Regressors per problem including the intercept (N).
    #[arg(short = 'c', long, default_value_t = 4)]
    pub cols: usize,

    /// Standard deviation of the observation noise (0 = exact fit).
    #[arg(long, default_value_t = 0.5)]
    pub noise: f64,

    /// Seed of the first problem; problem i uses seed + i.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of problems to generate.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    #[command(flatten)]
    pub solver: SolverArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_example_with_defaults() {
        let cli = Cli::try_parse_from(["linfit", "example"]).unwrap();
        assert_eq!(cli.log_level, tracing::Level::WARN);
        let Command::Example(args) = cli.command else {
            panic!("expected example command");
        };
        assert_eq!(args.solver.method, MethodChoice::Both);
        assert_eq!(args.solver.rcond_tol, DEFAULT_GRAM_RCOND_TOL);
        assert!(args.solver.json.is_none());
    }

    #[test]
    fn parses_synthetic_flags() {
        let cli = Cli::try_parse_from([
            "linfit",
            "--log-level",
            "debug",
            "synthetic",
            "--rows",
            "20",
            "--cols",
            "3",
            "--count",
            "5",
            "--method",
            "qr",
            "--rank-tol",
            "1e-8",
        ])
        .unwrap();
        assert_eq!(cli.log_level, tracing::Level::DEBUG);
        let Command::Synthetic(args) = cli.command else {
            panic!("expected synthetic command");
        };
        assert_eq!((args.rows, args.cols, args.count), (20, 3, 5));
        assert_eq!(args.solver.method.methods(), vec![Method::Qr]);
        assert_eq!(args.solver.rank_tol, 1e-8);
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(Cli::try_parse_from(["linfit", "example", "--method", "svd"]).is_err());
    }
}
