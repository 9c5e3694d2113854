//! Error types.
//!
//! - [`SolveError`] is what the library returns from every fallible solve.
//! - [`AppError`] is what the binary reports: a message plus a process exit code.

/// Typed failure of a least-squares solve.
///
/// Ill-conditioning is a property of the input, so none of these are retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    /// Row/column counts do not line up (including `N > M` and empty inputs).
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A matrix or vector entry is NaN or infinite.
    #[error("non-finite input: {0}")]
    NonFiniteInput(String),

    /// The Gram matrix `XᵗX` is singular or too ill-conditioned to solve.
    #[error("singular design matrix: Gram matrix condition number ≈ {condition_number:.3e}")]
    SingularDesignMatrix { condition_number: f64 },

    /// `R` has a (numerically) zero diagonal entry at `column`.
    #[error("rank-deficient design matrix: column {column} is linearly dependent (|R[{column}][{column}]| = {diagonal:.3e})")]
    RankDeficientDesignMatrix { column: usize, diagonal: f64 },

    /// An intermediate quantity (such as `XᵗX`) left the range of `f64` even
    /// though every input entry was finite.
    #[error("numerical overflow: {0}")]
    NumericalOverflow(String),

    /// A solver tolerance or generator parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SolveError {
    /// `true` for failures caused by the numbers rather than the shapes.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            SolveError::SingularDesignMatrix { .. }
                | SolveError::RankDeficientDesignMatrix { .. }
                | SolveError::NumericalOverflow(_)
        )
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<SolveError> for AppError {
    fn from(err: SolveError) -> Self {
        let exit_code = match err {
            SolveError::DimensionMismatch(_)
            | SolveError::NonFiniteInput(_)
            | SolveError::InvalidConfig(_) => 2,
            SolveError::SingularDesignMatrix { .. }
            | SolveError::RankDeficientDesignMatrix { .. }
            | SolveError::NumericalOverflow(_) => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
