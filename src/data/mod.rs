//! Problem sources: the built-in worked example and seeded synthetic problems.

pub mod example;
pub mod synthetic;

pub use example::*;
pub use synthetic::*;
