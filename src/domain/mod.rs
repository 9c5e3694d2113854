//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - validated inputs (`DesignMatrix`, `ObservationVector`, `LeastSquaresProblem`)
//! - outputs (`CoefficientVector`, `ResidualVector`, `LeastSquaresFit`)
//! - solver selection and tolerances (`Method`, `SolverConfig`)

pub mod types;

pub use types::*;
