//! CSV ingest of calibration points and residual export.
//!
//! One CSV file holds one source's points. Required columns (by header name):
//! `x`, `y`, `x_err`, `y_err`.
//!
//! Design goals:
//! - **Strict schema** for the header (clear errors + exit code 2)
//! - **Row-level validation**: bad rows are skipped but reported
//! - **Deterministic behavior**: rows are used in file order

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::StringRecord;

use crate::domain::CalibrationPoint;
use crate::error::CalError;
use crate::graph::CalibrationGraphSet;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based line number in the CSV file (header is line 1).
    pub line: usize,
    pub message: String,
}

/// Ingest output: usable points plus what was skipped.
#[derive(Debug, Clone)]
pub struct PointFile {
    pub points: Vec<CalibrationPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load one source's calibration points from a CSV file.
pub fn read_points_csv(path: &Path) -> Result<PointFile, CalError> {
    let file = File::open(path)
        .map_err(|e| CalError::Io(format!("failed to open points CSV '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| CalError::Io(format!("failed to read CSV header: {e}")))?
        .clone();
    let col = |name: &str| -> Result<usize, CalError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                CalError::Io(format!(
                    "points CSV '{}' is missing required column '{name}'",
                    path.display()
                ))
            })
    };
    let ix = col("x")?;
    let iy = col("y")?;
    let ixe = col("x_err")?;
    let iye = col("y_err")?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (row, record) in reader.records().enumerate() {
        let line = row + 2;
        rows_read += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError { line, message: format!("unreadable row: {e}") });
                continue;
            }
        };
        match parse_row(&record, ix, iy, ixe, iye) {
            Ok(p) => points.push(p),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    Ok(PointFile { points, row_errors, rows_read })
}

fn parse_row(
    record: &StringRecord,
    ix: usize,
    iy: usize,
    ixe: usize,
    iye: usize,
) -> Result<CalibrationPoint, String> {
    let field = |i: usize, name: &str| -> Result<f64, String> {
        let raw = record.get(i).ok_or_else(|| format!("missing '{name}' field"))?;
        let value: f64 = raw.parse().map_err(|_| format!("bad '{name}' value '{raw}'"))?;
        if !value.is_finite() {
            return Err(format!("non-finite '{name}' value '{raw}'"));
        }
        Ok(value)
    };
    Ok(CalibrationPoint::new(
        field(ix, "x")?,
        field(iy, "y")?,
        field(ixe, "x_err")?,
        field(iye, "y_err")?,
    ))
}

/// Write the merged residual view to a CSV file.
///
/// Requires valid residuals (`set_residual` after the latest fit); columns:
/// total index, owning source label, x, y, fitted y, residual, errors.
pub fn write_residuals_csv(path: &Path, set: &CalibrationGraphSet) -> Result<(), CalError> {
    let f = set.fit_function().ok_or(CalError::MissingFit)?;
    if !set.residual_set() {
        return Err(CalError::MissingFit);
    }

    let mut file = File::create(path)
        .map_err(|e| CalError::Io(format!("failed to create residual CSV '{}': {e}", path.display())))?;
    writeln!(file, "index,source,x,y,y_fit,residual,x_err,y_err")
        .map_err(|e| CalError::Io(format!("failed to write residual CSV header: {e}")))?;

    for (i, p) in set.total_points().iter().enumerate() {
        let sid = set.graph_index(i).unwrap_or(0);
        let label = set.graph(sid).map(|g| g.label().to_string()).unwrap_or_default();
        let r = set.total_residual_points()[i];
        writeln!(
            file,
            "{i},{label},{:.10},{:.10},{:.10},{:.10},{:.10},{:.10}",
            p.x,
            p.y,
            f.eval(p.x),
            r.y,
            p.x_err,
            p.y_err,
        )
        .map_err(|e| CalError::Io(format!("failed to write residual CSV row: {e}")))?;
    }

    Ok(())
}
