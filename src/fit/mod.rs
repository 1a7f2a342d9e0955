//! Default fit solver behind the engine's fit seam.
//!
//! The aggregation engine treats the solver as opaque: it hands over the total
//! graph's points and retains whatever `FittedFunction` comes back. This
//! module provides the batteries-included polynomial solver; external solvers
//! plug in through `CalibrationGraphSet::attach_fit`.

pub mod solver;

pub use solver::*;
