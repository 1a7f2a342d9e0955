//! Read/write saved calibration set files (JSON).
//!
//! A set file is the portable representation of a whole aggregation session:
//! every source graph, the merged total graph, the provenance arrays, the
//! residual graphs and flag, and the attached fit. Round-tripping a set
//! through JSON reproduces it exactly.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CalError;
use crate::graph::CalibrationGraphSet;

/// A saved calibration set (JSON schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetFile {
    pub tool: String,
    pub saved: NaiveDate,
    pub set: CalibrationGraphSet,
}

/// Write a set to a JSON file.
pub fn write_set_json(path: &Path, set: &CalibrationGraphSet) -> Result<(), CalError> {
    let file = File::create(path)
        .map_err(|e| CalError::Io(format!("failed to create set file '{}': {e}", path.display())))?;
    let wrapper = SetFile {
        tool: "calib".to_string(),
        saved: chrono::Local::now().date_naive(),
        set: set.clone(),
    };
    serde_json::to_writer_pretty(file, &wrapper)
        .map_err(|e| CalError::Io(format!("failed to write set file: {e}")))?;
    Ok(())
}

/// Read a set from a JSON file.
pub fn read_set_json(path: &Path) -> Result<SetFile, CalError> {
    let file = File::open(path)
        .map_err(|e| CalError::Io(format!("failed to open set file '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| CalError::Io(format!("invalid set file: {e}")))
}
