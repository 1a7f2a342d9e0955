//! Scaling engine: align one source onto a fitted reference curve.
//!
//! Sources measuring the same response under different gain/activity
//! conditions disagree by (to first order) a single multiplicative factor.
//! For a source with points `(x_i, y_i, σ_i)` and an attached fitted function
//! `f`, the factor applied as `y_i ← s·y_i` that best maps the source onto
//! the curve minimizes
//!
//! ```text
//! Σ (s · y_i - f(x_i))^2 / σ_i^2
//! ```
//!
//! and has the closed form
//!
//! ```text
//! s = Σ y_i f(x_i) / σ_i^2  ÷  Σ y_i^2 / σ_i^2
//! ```
//!
//! Points with a non-positive or non-finite y-error are excluded from the
//! weighted sums. If exclusion leaves the sums empty or degenerate, the
//! factor is recomputed with unit weights; if that is still degenerate the
//! source cannot be aligned and `None` is returned.

use crate::domain::{CalibrationPoint, FittedFunction};

/// Best single multiplicative factor mapping `points` onto `f`.
pub fn scale_factor(points: &[CalibrationPoint], f: &FittedFunction) -> Option<f64> {
    weighted_factor(points, f, true).or_else(|| weighted_factor(points, f, false))
}

fn weighted_factor(points: &[CalibrationPoint], f: &FittedFunction, use_errors: bool) -> Option<f64> {
    let mut num = 0.0;
    let mut den = 0.0;

    for p in points {
        if !(p.x.is_finite() && p.y.is_finite()) {
            continue;
        }
        let w = if use_errors {
            if !(p.y_err.is_finite() && p.y_err > 0.0) {
                continue;
            }
            1.0 / (p.y_err * p.y_err)
        } else {
            1.0
        };
        let fx = f.eval(p.x);
        if !fx.is_finite() {
            continue;
        }
        num += w * p.y * fx;
        den += w * p.y * p.y;
    }

    if den > 0.0 && num.is_finite() && den.is_finite() {
        let s = num / den;
        if s.is_finite() {
            return Some(s);
        }
    }
    None
}
