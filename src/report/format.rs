//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::graph::CalibrationGraphSet;

/// Format the set summary: sources, point counts, bounds, and the fit.
pub fn format_set_summary(set: &CalibrationGraphSet) -> String {
    let mut out = String::new();

    out.push_str("=== calib - multi-source calibration ===\n");
    out.push_str(&format!(
        "Sources: {} | total points: {}\n",
        set.number_of_graphs(),
        set.n()
    ));
    out.push_str(&format!(
        "x=[{:.3}, {:.3}] | y=[{:.3}, {:.3}]\n",
        set.minimum_x(),
        set.maximum_x(),
        set.minimum_y(),
        set.maximum_y()
    ));

    for (id, graph) in set.graphs().iter().enumerate() {
        out.push_str(&format!(
            "  [{id}] {:<16} n={} marker='{}'\n",
            graph.label(),
            graph.len(),
            graph.style().marker
        ));
    }

    match set.fit_function() {
        Some(f) => {
            out.push_str(&format!(
                "\nFit: {} | params: {} | SSE={:.4} RMSE={:.4} (n={})\n",
                f.model.display_name(),
                fmt_vec(&f.params),
                f.quality.sse,
                f.quality.rmse,
                f.quality.n
            ));
        }
        None => out.push_str("\nFit: none\n"),
    }

    out
}

/// Format one pass of scale factors, flagging sources that moved noticeably.
pub fn format_scale_report(set: &CalibrationGraphSet, factors: &[f64]) -> String {
    let mut out = String::new();
    out.push_str("Scale factors (source 0 is the reference):\n");
    for (id, factor) in factors.iter().enumerate() {
        let label = set.graph(id).map(|g| g.label()).unwrap_or("?");
        let note = if id == 0 {
            "  (reference)"
        } else if (factor - 1.0).abs() > 1e-3 {
            "  *"
        } else {
            ""
        };
        out.push_str(&format!("  [{id}] {label:<16} s={factor:.6}{note}\n"));
    }
    out
}

/// Format the merged residual table (requires valid residuals).
pub fn format_residual_table(set: &CalibrationGraphSet) -> String {
    let mut out = String::new();
    if !set.residual_set() {
        out.push_str("Residuals: not set\n");
        return out;
    }

    out.push_str("Residuals:\n");
    out.push_str(&format!(
        "{:>5} {:<16} {:>12} {:>12} {:>12}\n",
        "idx", "source", "x", "y", "residual"
    ));
    for (i, p) in set.total_points().iter().enumerate() {
        let sid = set.graph_index(i).unwrap_or(0);
        let label = set.graph(sid).map(|g| g.label()).unwrap_or("?");
        let r = set.total_residual_points()[i];
        out.push_str(&format!(
            "{i:>5} {label:<16} {:>12.3} {:>12.3} {:>12.4}\n",
            p.x, p.y, r.y
        ));
    }
    out
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
