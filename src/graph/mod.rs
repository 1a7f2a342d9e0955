//! The calibration aggregation engine.
//!
//! - `source`: one labeled source's ordered calibration points
//! - `align`: the scaling engine (single multiplicative factor per source)
//! - `set`: the orchestrator owning sources, the merged total graph, the
//!   residual graphs, and the provenance index

pub mod align;
pub mod set;
pub mod source;

pub use set::CalibrationGraphSet;
pub use source::SourceGraph;
