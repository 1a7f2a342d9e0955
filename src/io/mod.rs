//! File I/O: calibration point CSVs and saved set files.

pub mod points;
pub mod setfile;
