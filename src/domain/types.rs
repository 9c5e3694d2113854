//! Shared domain types.
//!
//! The inputs (`DesignMatrix`, `ObservationVector`) validate themselves once at
//! construction and are immutable afterwards, so the solvers only need to check
//! that the two shapes agree.
//!
//! Outputs are plain `nalgebra` vectors owned by the caller.

use clap::ValueEnum;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::SolveError;

/// Output β of a solve (length N).
pub type CoefficientVector = DVector<f64>;

/// `Xβ - y` (length M). Positive entries mean the model over-predicts.
pub type ResidualVector = DVector<f64>;

/// An M×N dense design matrix: one row per observation, one column per regressor.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    inner: DMatrix<f64>,
}

impl DesignMatrix {
    /// Wrap an existing matrix, rejecting empty shapes and non-finite entries.
    pub fn new(inner: DMatrix<f64>) -> Result<Self, SolveError> {
        if inner.nrows() == 0 || inner.ncols() == 0 {
            return Err(SolveError::DimensionMismatch(format!(
                "design matrix must be non-empty, got {}x{}",
                inner.nrows(),
                inner.ncols()
            )));
        }
        if let Some(idx) = inner.iter().position(|v| !v.is_finite()) {
            // nalgebra storage is column-major.
            let (row, col) = (idx % inner.nrows(), idx / inner.nrows());
            return Err(SolveError::NonFiniteInput(format!(
                "design matrix entry ({row}, {col}) is {}",
                inner[(row, col)]
            )));
        }
        Ok(Self { inner })
    }

    /// Build from row-major data (`nrows * ncols` values).
    pub fn from_row_slice(nrows: usize, ncols: usize, data: &[f64]) -> Result<Self, SolveError> {
        let Some(expected) = nrows.checked_mul(ncols) else {
            return Err(SolveError::DimensionMismatch(format!(
                "a {nrows}x{ncols} matrix has more entries than fit in memory"
            )));
        };
        if data.len() != expected {
            return Err(SolveError::DimensionMismatch(format!(
                "expected {expected} values for a {nrows}x{ncols} matrix, got {}",
                data.len()
            )));
        }
        Self::new(DMatrix::from_row_slice(nrows, ncols, data))
    }

    /// Build from a list of equally long rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SolveError> {
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
            return Err(SolveError::DimensionMismatch(format!(
                "row {i} has {} columns, expected {ncols}",
                row.len()
            )));
        }
        let data: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::from_row_slice(rows.len(), ncols, &data)
    }

    /// Number of observations (M).
    pub fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    /// Number of regressors (N).
    pub fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.inner
    }
}

/// Length-M vector of observed dependent-variable values.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationVector {
    inner: DVector<f64>,
}

impl ObservationVector {
    pub fn new(inner: DVector<f64>) -> Result<Self, SolveError> {
        if inner.is_empty() {
            return Err(SolveError::DimensionMismatch(
                "observation vector must be non-empty".to_string(),
            ));
        }
        if let Some(i) = inner.iter().position(|v| !v.is_finite()) {
            return Err(SolveError::NonFiniteInput(format!(
                "observation {i} is {}",
                inner[i]
            )));
        }
        Ok(Self { inner })
    }

    pub fn from_slice(values: &[f64]) -> Result<Self, SolveError> {
        Self::new(DVector::from_column_slice(values))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_vector(&self) -> &DVector<f64> {
        &self.inner
    }
}

/// A design matrix paired with its observations.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresProblem {
    pub design: DesignMatrix,
    pub observations: ObservationVector,
}

impl LeastSquaresProblem {
    pub fn new(design: DesignMatrix, observations: ObservationVector) -> Self {
        Self {
            design,
            observations,
        }
    }
}

/// Which algorithm produced (or should produce) a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// `β = (XᵗX)⁻¹Xᵗy` via a Cholesky solve of the Gram system.
    #[value(name = "normal")]
    #[serde(rename = "normal")]
    NormalEquations,
    /// Householder QR followed by back-substitution on `Rβ = Qᵗy`.
    Qr,
}

impl Method {
    pub const ALL: [Method; 2] = [Method::NormalEquations, Method::Qr];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Method::NormalEquations => "normal equations",
            Method::Qr => "Householder QR",
        }
    }

    /// Power of `cond(X)` that bounds the relative error in β.
    ///
    /// Normal equations factor `XᵗX`, whose condition number is `cond(X)²`;
    /// QR works on X directly.
    pub fn condition_exponent(self) -> u32 {
        match self {
            Method::NormalEquations => 2,
            Method::Qr => 1,
        }
    }

    pub fn squares_condition_number(self) -> bool {
        self.condition_exponent() == 2
    }
}

/// Default minimum reciprocal condition number of `XᵗX`.
///
/// `cond(XᵗX) = cond(X)²`, so this rejects designs with `cond(X)` beyond ~1e6.
pub const DEFAULT_GRAM_RCOND_TOL: f64 = 1e-12;

/// Default relative threshold on `|R[k][k]|`, scaled by the largest column norm of X.
pub const DEFAULT_RANK_TOL: f64 = 1e-10;

/// Numerical tolerances for singularity / rank detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Normal equations fail when `λmin(XᵗX) / λmax(XᵗX)` falls below this.
    pub gram_rcond_tol: f64,
    /// QR fails when `|R[k][k]| <= rank_tol * max_j ‖X[:, j]‖₂` for some k.
    pub rank_tol: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gram_rcond_tol: DEFAULT_GRAM_RCOND_TOL,
            rank_tol: DEFAULT_RANK_TOL,
        }
    }
}

impl SolverConfig {
    pub fn with_gram_rcond_tol(mut self, tol: f64) -> Self {
        self.gram_rcond_tol = tol;
        self
    }

    pub fn with_rank_tol(mut self, tol: f64) -> Self {
        self.rank_tol = tol;
        self
    }

    /// Both tolerances must be finite and in `(0, 1)`.
    pub fn validate(&self) -> Result<(), SolveError> {
        for (name, tol) in [
            ("gram_rcond_tol", self.gram_rcond_tol),
            ("rank_tol", self.rank_tol),
        ] {
            if !tol.is_finite() || tol <= 0.0 || tol >= 1.0 {
                return Err(SolveError::InvalidConfig(format!(
                    "{name} must be in (0, 1), got {tol}"
                )));
            }
        }
        Ok(())
    }
}

/// Result of a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresFit {
    pub method: Method,
    pub coefficients: CoefficientVector,
    /// `Xβ - y`.
    pub residuals: ResidualVector,
    /// Sum of squared residuals (the minimized objective).
    pub sse: f64,
    pub rmse: f64,
    /// Reciprocal condition estimate: `λmin/λmax` of `XᵗX` for normal equations,
    /// `min|R_kk| / max|R_kk|` for QR.
    pub rcond_estimate: f64,
}
