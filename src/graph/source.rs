//! One source's ordered calibration points plus display metadata.

use serde::{Deserialize, Serialize};

use crate::domain::{CalibrationPoint, GraphStyle};

/// The ordered calibration points contributed by one measurement source/run,
/// plus its label and plot style.
///
/// Source graphs are plain value records owned by a `CalibrationGraphSet`;
/// all structural mutation goes through the set so the merged view and the
/// provenance index stay consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceGraph {
    label: String,
    style: GraphStyle,
    points: Vec<CalibrationPoint>,
}

impl SourceGraph {
    pub(crate) fn new(label: &str, style: GraphStyle, points: Vec<CalibrationPoint>) -> Self {
        Self {
            label: label.to_string(),
            style,
            points,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn style(&self) -> GraphStyle {
        self.style
    }

    pub(crate) fn style_mut(&mut self) -> &mut GraphStyle {
        &mut self.style
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub(crate) fn remove_point(&mut self, local_index: usize) {
        self.points.remove(local_index);
    }

    pub(crate) fn set_points(&mut self, points: Vec<CalibrationPoint>) {
        self.points = points;
    }

    /// Multiply every point's y and y-error by `factor` (gain alignment).
    pub(crate) fn scale(&mut self, factor: f64) {
        for p in &mut self.points {
            p.y *= factor;
            p.y_err *= factor;
        }
    }
}
