//! Mathematical utilities: dense primitives and Householder QR.

pub mod householder;
pub mod linalg;

pub use householder::*;
pub use linalg::*;
