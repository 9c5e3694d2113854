//! `linfit` library crate.
//!
//! Ordinary least squares `min ‖Xβ - y‖²` solved two ways:
//!
//! - normal equations, `β = (XᵗX)⁻¹Xᵗy` via Cholesky (squares `cond(X)`)
//! - Householder QR, `Rβ = Qᵗy` via back-substitution (preferred)
//!
//! The binary (`linfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the solvers are reusable on their own
//!
//! ```no_run
//! use linfit::data::worked_example;
//! use linfit::solver::{solve_normal_equations, solve_qr};
//!
//! let p = worked_example()?;
//! let a = solve_qr(&p.design, &p.observations)?;
//! let b = solve_normal_equations(&p.design, &p.observations)?;
//! assert!((a - b).amax() < 1e-6);
//! # Ok::<(), linfit::error::SolveError>(())
//! ```

pub mod app;
pub mod cli;
pub mod data;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod math;
pub mod report;
pub mod solver;
