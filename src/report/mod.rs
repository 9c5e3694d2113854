//! Reporting: terminal text and JSON export.

pub mod format;
pub mod json;

pub use format::*;
pub use json::*;
