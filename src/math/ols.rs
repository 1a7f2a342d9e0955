//! Weighted least squares solver.
//!
//! The engine solves one small linear regression per fit call:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - Rows are scaled by `sqrt(w_i)` and the problem is solved as ordinary
//!   least squares.
//! - SVD is used so tall systems (many more points than coefficients) solve
//!   robustly. The parameter dimension is tiny (2–4 coefficients), so SVD
//!   cost is irrelevant at the expected point counts.

use nalgebra::{DMatrix, DVector};

/// Solve a weighted least squares problem using SVD.
///
/// `x` is the `n × p` design matrix, `y` the `n` observations, `w` the `n`
/// per-row weights (must be positive and finite).
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_weighted_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    w: &[f64],
) -> Option<DVector<f64>> {
    let n = x.nrows();
    if y.len() != n || w.len() != n {
        return None;
    }
    if w.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return None;
    }

    let mut xw = x.clone();
    let mut yw = y.clone();
    for i in 0..n {
        let sw = w[i].sqrt();
        for j in 0..xw.ncols() {
            xw[(i, j)] *= sw;
        }
        yw[i] *= sw;
    }

    let svd = xw.svd(true, true);

    // Calibration points can cluster tightly in x, producing nearly collinear
    // power-basis columns. Try progressively looser tolerances before giving up.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(&yw, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
