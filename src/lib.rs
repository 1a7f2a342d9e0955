//! `calib-curves` library crate.
//!
//! Multi-source calibration aggregation: merge independently measured sets of
//! calibration points into one joint view, align gain-skewed sources onto a
//! common response curve, and track residuals and point provenance under
//! arbitrary insertion/removal/rescaling/refitting sequences.
//!
//! The binary (`calib`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the engine is reusable from other front-ends

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod graph;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
