//! ASCII plotting for terminal output.
//!
//! Intentionally "dumb" (fixed-size character grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - each source's points use that source's marker character
//! - the fitted curve is drawn with `-`
//! - the residual view draws a `.` zero line

use crate::graph::CalibrationGraphSet;

/// Render the calibration view: every source's points plus the fitted curve.
pub fn render_calibration(set: &CalibrationGraphSet, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = pad_range(set.minimum_x(), set.maximum_x(), 0.02);
    let mut y_min = set.minimum_y();
    let mut y_max = set.maximum_y();
    if let Some(f) = set.fit_function() {
        for i in 0..width {
            let x = map_back_x(i, x_min, x_max, width);
            let y = f.eval(x);
            if y.is_finite() {
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
    }
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points can overlay it.
    if let Some(f) = set.fit_function() {
        for i in 0..width {
            let x = map_back_x(i, x_min, x_max, width);
            let y = f.eval(x);
            if y.is_finite() && y >= y_min && y <= y_max {
                grid[map_y(y, y_min, y_max, height)][i] = '-';
            }
        }
    }

    for graph in set.graphs() {
        let marker = graph.style().marker;
        for p in graph.points() {
            let col = map_x(p.x, x_min, x_max, width);
            let row = map_y(p.y.clamp(y_min, y_max), y_min, y_max, height);
            grid[row][col] = marker;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Calibration: x=[{x_min:.2}, {x_max:.2}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    render_grid(&mut out, &grid);
    for (id, graph) in set.graphs().iter().enumerate() {
        out.push_str(&format!("  {} [{id}] {}\n", graph.style().marker, graph.label()));
    }
    out
}

/// Render the residual view around a zero line.
///
/// Empty output note when residuals are not set.
pub fn render_residual(set: &CalibrationGraphSet, width: usize, height: usize) -> String {
    if !set.residual_set() {
        return "Residuals: not set\n".to_string();
    }
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = pad_range(set.minimum_x(), set.maximum_x(), 0.02);
    let mut r_min = f64::INFINITY;
    let mut r_max = f64::NEG_INFINITY;
    for r in set.total_residual_points() {
        r_min = r_min.min(r.y);
        r_max = r_max.max(r.y);
    }
    // Keep zero inside the frame.
    r_min = r_min.min(0.0);
    r_max = r_max.max(0.0);
    let (r_min, r_max) = pad_range(r_min, r_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let zero_row = map_y(0.0, r_min, r_max, height);
    for cell in &mut grid[zero_row] {
        *cell = '.';
    }

    for (id, residual) in (0..set.number_of_graphs()).filter_map(|i| set.residual(i).map(|g| (i, g))) {
        let marker = set.graph(id).map(|g| g.style().marker).unwrap_or('o');
        for p in residual.points() {
            let col = map_x(p.x, x_min, x_max, width);
            let row = map_y(p.y, r_min, r_max, height);
            grid[row][col] = marker;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Residuals: x=[{x_min:.2}, {x_max:.2}] | r=[{r_min:.3}, {r_max:.3}]\n"
    ));
    render_grid(&mut out, &grid);
    out
}

fn render_grid(out: &mut String, grid: &[Vec<char>]) {
    for row in grid {
        out.push('|');
        out.extend(row.iter());
        out.push('|');
        out.push('\n');
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    if !(min.is_finite() && max.is_finite()) || max < min {
        return (0.0, 1.0);
    }
    let span = (max - min).abs();
    if span < 1e-12 {
        return (min - 0.5, max + 0.5);
    }
    (min - frac * span, max + frac * span)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    ((u * (width as f64 - 1.0)).round() as usize).min(width - 1)
}

fn map_back_x(col: usize, x_min: f64, x_max: f64, width: usize) -> f64 {
    let u = col as f64 / (width as f64 - 1.0);
    x_min + u * (x_max - x_min)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    let row = ((1.0 - u) * (height as f64 - 1.0)).round() as usize;
    row.min(height - 1)
}
