//! The four-person height/weight example.
//!
//! Columns: intercept, weight (kg), height (cm). Observations: a fourth
//! measurement per person. Small enough to check by hand, and `XᵗX` is already
//! ill-conditioned (`rcond ≈ 1.3e-8`) because the raw columns are not centered.

use crate::domain::{DesignMatrix, LeastSquaresProblem, ObservationVector};
use crate::error::SolveError;

const ROWS: usize = 4;
const COLS: usize = 3;

#[rustfmt::skip]
const DESIGN: [f64; ROWS * COLS] = [
    1.0, 70.0, 177.0,
    1.0, 86.0, 190.0,
    1.0, 63.0, 180.0,
    1.0, 62.0, 172.0,
];

const OBSERVATIONS: [f64; ROWS] = [175.0, 181.0, 159.0, 165.0];

/// Regressor labels, in column order.
pub const WORKED_EXAMPLE_LABELS: [&str; COLS] = ["intercept", "weight", "height"];

/// `X` and `y` of the worked example.
pub fn worked_example() -> Result<LeastSquaresProblem, SolveError> {
    let design = DesignMatrix::from_row_slice(ROWS, COLS, &DESIGN)?;
    let observations = ObservationVector::from_slice(&OBSERVATIONS)?;
    Ok(LeastSquaresProblem::new(design, observations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_shape() {
        let p = worked_example().unwrap();
        assert_eq!(p.design.nrows(), 4);
        assert_eq!(p.design.ncols(), WORKED_EXAMPLE_LABELS.len());
        assert_eq!(p.observations.len(), 4);
        assert!(p.design.as_matrix().column(0).iter().all(|v| *v == 1.0));
    }
}
