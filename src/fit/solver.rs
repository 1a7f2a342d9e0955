//! Inverse-variance weighted polynomial fit.
//!
//! Given calibration points `(x_i, y_i, σ_i)` and a polynomial model, solve
//!
//! ```text
//! minimize Σ (y_i - p(x_i))^2 / σ_i^2
//! ```
//!
//! for the coefficients of `p`. Points with a non-positive y-error are given
//! a floor error (the smallest positive y-error in the set, or 1.0 if there is
//! none) so a few zero-error points cannot blow up the weighting.

use nalgebra::{DMatrix, DVector};

use crate::domain::{CalibrationPoint, FitQuality, FittedFunction, ModelKind};
use crate::error::CalError;
use crate::math::solve_weighted_least_squares;

/// Fill one design row with powers of `x`, constant term first.
///
/// # Panics
/// Panics if `out` does not have length `model.param_count()`.
pub fn fill_design_row(model: ModelKind, x: f64, out: &mut [f64]) {
    debug_assert_eq!(out.len(), model.param_count());
    let mut pow = 1.0;
    for slot in out.iter_mut() {
        *slot = pow;
        pow *= x;
    }
}

/// Fit a polynomial model to the given points.
pub fn solve(model: ModelKind, points: &[CalibrationPoint]) -> Result<FittedFunction, CalError> {
    let n = points.len();
    let p = model.param_count();
    if n < p {
        return Err(CalError::Fit(format!(
            "{} fit needs at least {p} points, got {n}",
            model.display_name()
        )));
    }
    if points.iter().any(|pt| !pt.is_finite()) {
        return Err(CalError::Fit("non-finite calibration point".to_string()));
    }

    let w = weights(points);

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];
    for (i, pt) in points.iter().enumerate() {
        fill_design_row(model, pt.x, &mut row);
        for j in 0..p {
            x[(i, j)] = row[j];
        }
        y[i] = pt.y;
    }

    let beta = solve_weighted_least_squares(&x, &y, &w).ok_or_else(|| {
        CalError::Fit(format!(
            "{} design matrix is too ill-conditioned",
            model.display_name()
        ))
    })?;
    let params: Vec<f64> = beta.iter().copied().collect();

    let f = FittedFunction {
        model,
        params,
        quality: FitQuality { sse: 0.0, rmse: 0.0, n },
    };

    // Weighted SSE against the unweighted prediction.
    let mut sse = 0.0;
    for (pt, wi) in points.iter().zip(w.iter()) {
        let r = pt.y - f.eval(pt.x);
        sse += wi * r * r;
    }
    if !sse.is_finite() {
        return Err(CalError::Fit("non-finite fit residual sum".to_string()));
    }

    Ok(FittedFunction {
        quality: FitQuality {
            sse,
            rmse: (sse / n as f64).sqrt(),
            n,
        },
        ..f
    })
}

/// Inverse-variance weights with a floor for non-positive y-errors.
fn weights(points: &[CalibrationPoint]) -> Vec<f64> {
    let floor = points
        .iter()
        .map(|p| p.y_err)
        .filter(|e| *e > 0.0 && e.is_finite())
        .fold(f64::INFINITY, f64::min);
    let floor = if floor.is_finite() { floor } else { 1.0 };

    points
        .iter()
        .map(|p| {
            let sigma = if p.y_err > 0.0 { p.y_err } else { floor };
            1.0 / (sigma * sigma)
        })
        .collect()
}
