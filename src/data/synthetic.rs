//! Seeded synthetic regression problems.
//!
//! Layout of a generated problem:
//!
//! - column 0 is the intercept (all ones)
//! - columns 1..N are independent standard normal predictors
//! - `β_true ~ N(0, 1)` per coefficient
//! - `y = Xβ_true + ε`, `ε ~ N(0, noise_sd²)`
//!
//! With `noise_sd = 0` the observations lie exactly in the column space of X,
//! which is what the exact-recovery checks rely on. Gaussian designs like these
//! are full rank with probability one and well conditioned for `M ≫ N`.

use nalgebra::{DMatrix, DVector};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CoefficientVector, DesignMatrix, LeastSquaresProblem, ObservationVector};
use crate::error::SolveError;

/// A generated problem together with the coefficients that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticProblem {
    pub problem: LeastSquaresProblem,
    pub beta_true: CoefficientVector,
    pub noise_sd: f64,
    pub seed: u64,
}

/// Generate one problem. The same `(rows, cols, noise_sd, seed)` always gives the
/// same output.
pub fn synthetic_problem(
    rows: usize,
    cols: usize,
    noise_sd: f64,
    seed: u64,
) -> Result<SyntheticProblem, SolveError> {
    if cols == 0 || rows < cols {
        return Err(SolveError::DimensionMismatch(format!(
            "synthetic problems need 1 <= cols <= rows, got {rows}x{cols}"
        )));
    }
    if !noise_sd.is_finite() || noise_sd < 0.0 {
        return Err(SolveError::InvalidConfig(format!(
            "noise standard deviation must be finite and >= 0, got {noise_sd}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| SolveError::InvalidConfig(format!("predictor distribution error: {e}")))?;
    let noise = Normal::new(0.0, noise_sd)
        .map_err(|e| SolveError::InvalidConfig(format!("noise distribution error: {e}")))?;

    // Row-major fill keeps the draw order independent of nalgebra's storage order.
    let mut data = Vec::with_capacity(rows * cols);
    for _ in 0..rows {
        data.push(1.0);
        for _ in 1..cols {
            data.push(standard.sample(&mut rng));
        }
    }
    let x = DMatrix::from_row_slice(rows, cols, &data);

    let beta_true = DVector::from_fn(cols, |_, _| standard.sample(&mut rng));
    let mut y = &x * &beta_true;
    if noise_sd > 0.0 {
        for v in y.iter_mut() {
            *v += noise.sample(&mut rng);
        }
    }

    Ok(SyntheticProblem {
        problem: LeastSquaresProblem::new(DesignMatrix::new(x)?, ObservationVector::new(y)?),
        beta_true,
        noise_sd,
        seed,
    })
}

/// `count` problems with seeds `base_seed, base_seed + 1, …`.
pub fn synthetic_batch(
    count: usize,
    rows: usize,
    cols: usize,
    noise_sd: f64,
    base_seed: u64,
) -> Result<Vec<SyntheticProblem>, SolveError> {
    (0..count as u64)
        .map(|i| synthetic_problem(rows, cols, noise_sd, base_seed.wrapping_add(i)))
        .collect()
}
