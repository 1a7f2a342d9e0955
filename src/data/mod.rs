//! Synthetic calibration data for the demo subcommand and scenario tests.

pub mod sample;

pub use sample::*;
