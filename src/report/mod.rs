//! Reporting utilities: formatted terminal output for sets, fits, and residuals.

pub mod format;

pub use format::*;
