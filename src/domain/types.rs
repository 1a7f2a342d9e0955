//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the aggregation engine
//! - exported to JSON/CSV
//! - reloaded later for inspection or re-fitting

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A single calibration measurement: measured position vs. known reference
/// value, with uncertainties on both axes.
///
/// Plain value type; a point has no identity beyond its position in a graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Measured position (e.g. peak channel or ADC value).
    pub x: f64,
    /// Known reference value (e.g. tabulated transition energy).
    pub y: f64,
    /// Uncertainty on `x`.
    pub x_err: f64,
    /// Uncertainty on `y`.
    pub y_err: f64,
}

impl CalibrationPoint {
    pub fn new(x: f64, y: f64, x_err: f64, y_err: f64) -> Self {
        Self { x, y, x_err, y_err }
    }

    /// True if all four components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x_err.is_finite() && self.y_err.is_finite()
    }
}

/// Display metadata for one source graph.
///
/// Color indices follow the usual small-palette convention; the marker is the
/// character used for this source in terminal plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStyle {
    pub line_color: i16,
    pub marker_color: i16,
    pub marker: char,
}

const MARKERS: [char; 6] = ['o', 'x', '+', '*', '#', '@'];

impl GraphStyle {
    /// Default style for the source with the given registration id.
    ///
    /// Deterministic: the same id always gets the same style, so styles stay
    /// stable across save/restore and re-runs.
    pub fn for_source(id: usize) -> Self {
        let slot = id % MARKERS.len();
        Self {
            line_color: slot as i16 + 1,
            marker_color: slot as i16 + 1,
            marker: MARKERS[slot],
        }
    }
}

/// Polynomial calibration model fitted to the total graph.
///
/// Energy calibrations are almost always low-order polynomials in the
/// measured position; anything fancier plugs in through `attach_fit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Quadratic,
    Cubic,
}

impl ModelKind {
    /// Number of polynomial coefficients (constant term first).
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::Linear => 2,
            ModelKind::Quadratic => 3,
            ModelKind::Cubic => 4,
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Quadratic => "quadratic",
            ModelKind::Cubic => "cubic",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    /// Weighted sum of squared residuals.
    pub sse: f64,
    pub rmse: f64,
    /// Number of points used in the fit.
    pub n: usize,
}

/// The response function attached to the total graph after a successful fit.
///
/// The engine only ever needs to *evaluate* this at a given x (for residuals
/// and scaling), so any external solver can produce one as long as it can
/// express its result as polynomial coefficients, constant term first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedFunction {
    pub model: ModelKind,
    /// Polynomial coefficients, constant term first.
    pub params: Vec<f64>,
    pub quality: FitQuality,
}

impl FittedFunction {
    /// Evaluate the fitted response at `x` (Horner's scheme).
    pub fn eval(&self, x: f64) -> f64 {
        self.params.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }
}
