//! The calibration graph set: merged view, residuals, and provenance.
//!
//! A `CalibrationGraphSet` owns:
//!
//! - one `SourceGraph` per registered source (sources are appended by `add`
//!   and never removed, only emptied point by point)
//! - the total graph: every source's points concatenated in registration
//!   order, used for the joint fit
//! - two parallel provenance arrays mapping each total-graph index back to
//!   `(source id, local point index)`
//! - one residual graph per source plus the merged residual graph, valid only
//!   while `residual_set` is true
//!
//! Every public operation either completes fully or returns an error without
//! mutating anything.

use serde::{Deserialize, Serialize};

use crate::domain::{CalibrationPoint, FittedFunction, GraphStyle, ModelKind};
use crate::error::CalError;
use crate::graph::align::scale_factor;
use crate::graph::source::SourceGraph;

/// Orchestrator for multi-source calibration aggregation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationGraphSet {
    graphs: Vec<SourceGraph>,
    residual_graphs: Vec<SourceGraph>,
    /// Concatenation of all source points, in registration order.
    total: Vec<CalibrationPoint>,
    /// Residual counterpart of `total`, index-aligned one-to-one.
    total_residual: Vec<CalibrationPoint>,
    /// Which source owns total point `i`.
    graph_index: Vec<usize>,
    /// That point's position within its source.
    point_index: Vec<usize>,
    /// True only while the residual graphs match the current total graph and
    /// the currently attached fit.
    residual_set: bool,
    minimum_x: f64,
    maximum_x: f64,
    minimum_y: f64,
    maximum_y: f64,
    fit: Option<FittedFunction>,
}

impl CalibrationGraphSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set seeded with one initial source.
    pub fn with_source(points: &[CalibrationPoint], label: &str) -> Result<Self, CalError> {
        let mut set = Self::new();
        set.add(points, label)?;
        Ok(set)
    }

    /// Register a new source at the end of the source list.
    ///
    /// Rejects an empty point sequence and non-finite point values with
    /// `InvalidInput` (no mutation). On success the source's points are
    /// appended to the total graph in the given order, the provenance arrays
    /// are extended, and the new source's id (its position in the source
    /// list) is returned. Any previously computed residuals become stale.
    pub fn add(&mut self, points: &[CalibrationPoint], label: &str) -> Result<usize, CalError> {
        if points.is_empty() {
            return Err(CalError::InvalidInput(format!(
                "source \"{label}\" has no points"
            )));
        }
        if let Some(bad) = points.iter().position(|p| !p.is_finite()) {
            return Err(CalError::InvalidInput(format!(
                "source \"{label}\" point {bad} has a non-finite value"
            )));
        }

        let id = self.graphs.len();
        let style = GraphStyle::for_source(id);
        self.graphs.push(SourceGraph::new(label, style, points.to_vec()));
        self.residual_graphs.push(SourceGraph::new(label, style, Vec::new()));

        for (lid, p) in points.iter().enumerate() {
            self.total.push(*p);
            self.graph_index.push(id);
            self.point_index.push(lid);
        }

        self.residual_set = false;
        self.recompute_bounds();
        Ok(id)
    }

    /// Remove the total-graph point at `total_index` from the merged view,
    /// its owning source, and (when present) the residual graphs.
    ///
    /// Returns `OutOfRange` without mutation for a bad index. The owning
    /// source stays registered even if this empties it; provenance entries
    /// for later points of the same source are reindexed.
    pub fn remove_point(&mut self, total_index: usize) -> Result<(), CalError> {
        if total_index >= self.total.len() {
            return Err(CalError::OutOfRange {
                index: total_index,
                len: self.total.len(),
            });
        }

        let sid = self.graph_index[total_index];
        let lid = self.point_index[total_index];

        self.graphs[sid].remove_point(lid);
        self.total.remove(total_index);
        if self.residual_set {
            self.total_residual.remove(total_index);
            self.residual_graphs[sid].remove_point(lid);
        }
        self.graph_index.remove(total_index);
        self.point_index.remove(total_index);

        // Later points of the same source moved down one slot.
        for j in 0..self.point_index.len() {
            if self.graph_index[j] == sid && self.point_index[j] > lid {
                self.point_index[j] -= 1;
            }
        }

        self.residual_set = false;
        self.recompute_bounds();
        Ok(())
    }

    /// Remove a point via its index in the residual view.
    ///
    /// The residual graphs are always index-aligned one-to-one with the total
    /// graph, so this delegates to `remove_point` with the identical index.
    pub fn remove_residual_point(&mut self, residual_index: usize) -> Result<(), CalError> {
        self.remove_point(residual_index)
    }

    /// Rebuild the total graph and provenance arrays from the sources'
    /// current points, in registration order.
    ///
    /// Used after `scale` changes source point values, or to repair the
    /// merged view after external mutation of a source. Keeps the fit but
    /// marks residuals stale.
    pub fn reset_total_graph(&mut self) {
        self.total.clear();
        self.graph_index.clear();
        self.point_index.clear();
        for (sid, graph) in self.graphs.iter().enumerate() {
            for (lid, p) in graph.points().iter().enumerate() {
                self.total.push(*p);
                self.graph_index.push(sid);
                self.point_index.push(lid);
            }
        }
        self.residual_set = false;
        self.recompute_bounds();
    }

    /// Fit the given model to the total graph and attach the result.
    pub fn fit(&mut self, model: ModelKind) -> Result<&FittedFunction, CalError> {
        if self.total.is_empty() {
            return Err(CalError::Fit("total graph has no points".to_string()));
        }
        let f = crate::fit::solve(model, &self.total)?;
        self.residual_set = false;
        Ok(&*self.fit.insert(f))
    }

    /// Attach an externally produced fitted function.
    ///
    /// This is the seam for fit solvers other than the built-in polynomial
    /// one; the engine only ever evaluates the function.
    pub fn attach_fit(&mut self, f: FittedFunction) {
        self.fit = Some(f);
        self.residual_set = false;
    }

    /// The currently attached fitted function, if any.
    pub fn fit_function(&self) -> Option<&FittedFunction> {
        self.fit.as_ref()
    }

    /// Align every non-reference source onto the fitted curve.
    ///
    /// Source 0 is the reference and is never rescaled. For each other source
    /// a single multiplicative factor is derived by inverse-variance weighted
    /// least squares (see `align::scale_factor`) and applied to its y-values
    /// and y-errors; a source the factor cannot be derived for is left
    /// untouched (factor 1.0). All factors are computed before any mutation,
    /// then the total graph is rebuilt.
    ///
    /// Returns the per-source factors, `factors[0] == 1.0`. Fails with
    /// `MissingFit` (no mutation) when no fitted function is attached.
    pub fn scale(&mut self) -> Result<Vec<f64>, CalError> {
        let f = self.fit.clone().ok_or(CalError::MissingFit)?;

        let mut factors = vec![1.0; self.graphs.len()];
        for (k, graph) in self.graphs.iter().enumerate().skip(1) {
            factors[k] = scale_factor(graph.points(), &f).unwrap_or(1.0);
        }

        for (k, graph) in self.graphs.iter_mut().enumerate().skip(1) {
            graph.scale(factors[k]);
        }

        self.reset_total_graph();
        Ok(factors)
    }

    /// Compute residuals `y_i − f(x_i)` against the attached fit, for the
    /// total graph and for each source's residual sub-graph.
    ///
    /// Residual points keep the x, x-error, and y-error of their calibration
    /// counterparts and the same index alignment. No-op when residuals are
    /// already valid and `force` is false. Fails with `MissingFit` (no
    /// mutation) when no fitted function is attached.
    pub fn set_residual(&mut self, force: bool) -> Result<(), CalError> {
        let f = self.fit.clone().ok_or(CalError::MissingFit)?;
        if self.residual_set && !force {
            return Ok(());
        }

        let residual = |p: &CalibrationPoint| CalibrationPoint {
            x: p.x,
            y: p.y - f.eval(p.x),
            x_err: p.x_err,
            y_err: p.y_err,
        };

        self.total_residual = self.total.iter().map(residual).collect();
        for (graph, res) in self.graphs.iter().zip(self.residual_graphs.iter_mut()) {
            res.set_points(graph.points().iter().map(residual).collect());
        }

        self.residual_set = true;
        Ok(())
    }

    /// Whether the residual graphs are valid for the current total graph and fit.
    pub fn residual_set(&self) -> bool {
        self.residual_set
    }

    /// Number of points in the total graph.
    pub fn n(&self) -> usize {
        self.total.len()
    }

    /// The merged points, in registration order.
    pub fn total_points(&self) -> &[CalibrationPoint] {
        &self.total
    }

    /// The merged residual points; empty or stale unless `residual_set()`.
    pub fn total_residual_points(&self) -> &[CalibrationPoint] {
        &self.total_residual
    }

    /// x-values of the total graph.
    pub fn x(&self) -> Vec<f64> {
        self.total.iter().map(|p| p.x).collect()
    }

    /// y-values of the total graph.
    pub fn y(&self) -> Vec<f64> {
        self.total.iter().map(|p| p.y).collect()
    }

    /// x-errors of the total graph.
    pub fn x_err(&self) -> Vec<f64> {
        self.total.iter().map(|p| p.x_err).collect()
    }

    /// y-errors of the total graph.
    pub fn y_err(&self) -> Vec<f64> {
        self.total.iter().map(|p| p.y_err).collect()
    }

    pub fn minimum_x(&self) -> f64 {
        self.minimum_x
    }

    pub fn maximum_x(&self) -> f64 {
        self.maximum_x
    }

    pub fn minimum_y(&self) -> f64 {
        self.minimum_y
    }

    pub fn maximum_y(&self) -> f64 {
        self.maximum_y
    }

    /// Number of registered sources (including emptied ones).
    pub fn number_of_graphs(&self) -> usize {
        self.graphs.len()
    }

    pub fn graph(&self, id: usize) -> Option<&SourceGraph> {
        self.graphs.get(id)
    }

    pub fn residual(&self, id: usize) -> Option<&SourceGraph> {
        self.residual_graphs.get(id)
    }

    pub fn graphs(&self) -> &[SourceGraph] {
        &self.graphs
    }

    /// Provenance: the source owning total point `i`.
    pub fn graph_index(&self, i: usize) -> Option<usize> {
        self.graph_index.get(i).copied()
    }

    /// Provenance: total point `i`'s position within its source.
    pub fn point_index(&self, i: usize) -> Option<usize> {
        self.point_index.get(i).copied()
    }

    /// Set the line color of the source and residual graph at `id`.
    pub fn set_line_color(&mut self, id: usize, color: i16) {
        if let Some(g) = self.graphs.get_mut(id) {
            g.style_mut().line_color = color;
        }
        if let Some(g) = self.residual_graphs.get_mut(id) {
            g.style_mut().line_color = color;
        }
    }

    /// Set the marker color of the source and residual graph at `id`.
    pub fn set_marker_color(&mut self, id: usize, color: i16) {
        if let Some(g) = self.graphs.get_mut(id) {
            g.style_mut().marker_color = color;
        }
        if let Some(g) = self.residual_graphs.get_mut(id) {
            g.style_mut().marker_color = color;
        }
    }

    fn recompute_bounds(&mut self) {
        if self.total.is_empty() {
            self.minimum_x = 0.0;
            self.maximum_x = 0.0;
            self.minimum_y = 0.0;
            self.maximum_y = 0.0;
            return;
        }
        self.minimum_x = f64::INFINITY;
        self.maximum_x = f64::NEG_INFINITY;
        self.minimum_y = f64::INFINITY;
        self.maximum_y = f64::NEG_INFINITY;
        for p in &self.total {
            self.minimum_x = self.minimum_x.min(p.x);
            self.maximum_x = self.maximum_x.max(p.x);
            self.minimum_y = self.minimum_y.min(p.y);
            self.maximum_y = self.maximum_y.max(p.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, FittedFunction, ModelKind};

    fn pt(x: f64, y: f64, x_err: f64, y_err: f64) -> CalibrationPoint {
        CalibrationPoint::new(x, y, x_err, y_err)
    }

    fn line(p0: f64, p1: f64) -> FittedFunction {
        FittedFunction {
            model: ModelKind::Linear,
            params: vec![p0, p1],
            quality: FitQuality { sse: 0.0, rmse: 0.0, n: 0 },
        }
    }

    /// Invariants 1-3: total length, provenance shape, value equality.
    fn assert_consistent(set: &CalibrationGraphSet) {
        let per_source: usize = set.graphs().iter().map(|g| g.len()).sum();
        assert_eq!(set.n(), per_source);
        for i in 0..set.n() {
            let sid = set.graph_index(i).unwrap();
            let lid = set.point_index(i).unwrap();
            assert!(sid < set.number_of_graphs());
            let source = set.graph(sid).unwrap();
            assert!(lid < source.len());
            assert_eq!(set.total_points()[i], source.points()[lid]);
        }
    }

    #[test]
    fn add_rejects_empty_source() {
        let mut set = CalibrationGraphSet::new();
        let err = set.add(&[], "empty").unwrap_err();
        assert!(matches!(err, CalError::InvalidInput(_)));
        assert_eq!(set.number_of_graphs(), 0);
        assert_eq!(set.n(), 0);
    }

    #[test]
    fn add_rejects_non_finite_points() {
        let mut set = CalibrationGraphSet::new();
        let err = set
            .add(&[pt(1.0, f64::NAN, 0.1, 0.1)], "bad")
            .unwrap_err();
        assert!(matches!(err, CalError::InvalidInput(_)));
        assert_eq!(set.number_of_graphs(), 0);
    }

    #[test]
    fn add_merges_in_registration_order() {
        let mut set = CalibrationGraphSet::new();
        let a = set
            .add(&[pt(1.0, 10.0, 0.1, 0.5), pt(2.0, 20.0, 0.1, 0.5)], "A")
            .unwrap();
        let b = set.add(&[pt(1.0, 12.0, 0.1, 0.6)], "B").unwrap();
        assert_eq!((a, b), (0, 1));

        assert_eq!(set.n(), 3);
        assert_eq!(
            (0..3).map(|i| set.graph_index(i).unwrap()).collect::<Vec<_>>(),
            vec![0, 0, 1]
        );
        assert_eq!(
            (0..3).map(|i| set.point_index(i).unwrap()).collect::<Vec<_>>(),
            vec![0, 1, 0]
        );
        assert_eq!(set.minimum_x(), 1.0);
        assert_eq!(set.maximum_x(), 2.0);
        assert_eq!(set.minimum_y(), 10.0);
        assert_eq!(set.maximum_y(), 20.0);
        assert_consistent(&set);
    }

    #[test]
    fn remove_point_reindexes_provenance() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 10.0, 0.1, 0.5), pt(2.0, 20.0, 0.1, 0.5)], "A")
            .unwrap();
        set.add(&[pt(1.0, 12.0, 0.1, 0.6)], "B").unwrap();

        set.remove_point(1).unwrap();

        assert_eq!(set.n(), 2);
        assert_eq!(set.total_points()[0], pt(1.0, 10.0, 0.1, 0.5));
        assert_eq!(set.total_points()[1], pt(1.0, 12.0, 0.1, 0.6));
        assert_eq!(set.graph(0).unwrap().points(), &[pt(1.0, 10.0, 0.1, 0.5)]);
        assert_eq!(
            (0..2).map(|i| set.graph_index(i).unwrap()).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(
            (0..2).map(|i| set.point_index(i).unwrap()).collect::<Vec<_>>(),
            vec![0, 0]
        );
        assert_consistent(&set);
    }

    #[test]
    fn remove_point_reindexes_later_points_of_same_source() {
        let mut set = CalibrationGraphSet::new();
        set.add(
            &[
                pt(1.0, 1.0, 0.0, 0.1),
                pt(2.0, 2.0, 0.0, 0.1),
                pt(3.0, 3.0, 0.0, 0.1),
                pt(4.0, 4.0, 0.0, 0.1),
            ],
            "A",
        )
        .unwrap();
        set.add(&[pt(5.0, 5.0, 0.0, 0.1), pt(6.0, 6.0, 0.0, 0.1)], "B")
            .unwrap();

        // Remove A's second point; A's points 2 and 3 shift down by one.
        set.remove_point(1).unwrap();
        assert_eq!(
            (0..set.n()).map(|i| set.point_index(i).unwrap()).collect::<Vec<_>>(),
            vec![0, 1, 2, 0, 1]
        );
        assert_consistent(&set);
    }

    #[test]
    fn remove_point_out_of_range_is_atomic() {
        let mut set = CalibrationGraphSet::new();
        set.add(
            &[pt(1.0, 1.0, 0.0, 0.1), pt(2.0, 2.0, 0.0, 0.1), pt(3.0, 3.0, 0.0, 0.1)],
            "A",
        )
        .unwrap();
        let before = set.clone();

        let err = set.remove_point(5).unwrap_err();
        assert_eq!(err, CalError::OutOfRange { index: 5, len: 3 });
        assert_eq!(set, before);
    }

    #[test]
    fn source_survives_being_emptied() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 1.0, 0.0, 0.1)], "A").unwrap();
        set.add(&[pt(2.0, 2.0, 0.0, 0.1)], "B").unwrap();

        set.remove_point(0).unwrap();
        assert_eq!(set.number_of_graphs(), 2);
        assert!(set.graph(0).unwrap().is_empty());
        assert_eq!(set.graph(0).unwrap().label(), "A");
        // B's point is now total point 0 and still maps back correctly.
        assert_eq!(set.graph_index(0), Some(1));
        assert_eq!(set.point_index(0), Some(0));
        assert_consistent(&set);

        // A freshly added source still gets the next id.
        let id = set.add(&[pt(3.0, 3.0, 0.0, 0.1)], "C").unwrap();
        assert_eq!(id, 2);
        assert_consistent(&set);
    }

    #[test]
    fn remove_point_keeps_residual_alignment_but_marks_stale() {
        let mut set = CalibrationGraphSet::new();
        set.add(
            &[pt(1.0, 1.0, 0.0, 0.1), pt(2.0, 2.5, 0.0, 0.1), pt(3.0, 3.0, 0.0, 0.1)],
            "A",
        )
        .unwrap();
        set.attach_fit(line(0.0, 1.0));
        set.set_residual(false).unwrap();
        assert!(set.residual_set());

        set.remove_point(1).unwrap();
        assert!(!set.residual_set());
        // The residual arrays shrank in lockstep with the total graph.
        assert_eq!(set.total_residual_points().len(), 2);
        assert_eq!(set.residual(0).unwrap().len(), 2);
    }

    #[test]
    fn remove_residual_point_uses_the_merged_index() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 10.0, 0.1, 0.5), pt(2.0, 20.0, 0.1, 0.5)], "A")
            .unwrap();
        set.add(&[pt(1.0, 12.0, 0.1, 0.6)], "B").unwrap();
        set.attach_fit(line(0.0, 10.0));
        set.set_residual(false).unwrap();

        set.remove_residual_point(2).unwrap();
        assert_eq!(set.n(), 2);
        assert!(set.graph(1).unwrap().is_empty());
        assert_consistent(&set);
    }

    #[test]
    fn reset_total_graph_is_idempotent() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 1.0, 0.0, 0.1), pt(2.0, 2.0, 0.0, 0.1)], "A")
            .unwrap();
        set.add(&[pt(3.0, 3.0, 0.0, 0.1)], "B").unwrap();

        set.reset_total_graph();
        let once = set.clone();
        set.reset_total_graph();
        assert_eq!(set, once);
        assert_consistent(&set);
    }

    #[test]
    fn scale_without_fit_is_missing_fit_and_atomic() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 2.0, 0.1, 0.1)], "A").unwrap();
        set.add(&[pt(1.0, 3.0, 0.1, 0.1)], "B").unwrap();
        let before = set.clone();

        assert_eq!(set.scale().unwrap_err(), CalError::MissingFit);
        assert_eq!(set, before);
    }

    #[test]
    fn set_residual_without_fit_is_missing_fit() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 2.0, 0.1, 0.1)], "A").unwrap();
        let before = set.clone();

        assert_eq!(set.set_residual(false).unwrap_err(), CalError::MissingFit);
        assert!(!set.residual_set());
        assert_eq!(set, before);
    }

    #[test]
    fn scale_reference_source_is_never_rescaled() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 100.0, 0.1, 1.0), pt(2.0, 200.0, 0.1, 1.0)], "ref")
            .unwrap();
        // Second source measured with 10% too much gain.
        set.add(&[pt(1.0, 110.0, 0.1, 1.0), pt(2.0, 220.0, 0.1, 1.0)], "hot")
            .unwrap();
        set.attach_fit(line(0.0, 100.0));

        let factors = set.scale().unwrap();
        assert_eq!(factors.len(), 2);
        assert!((factors[0] - 1.0).abs() < 1e-12);
        assert!((factors[1] - 1.0 / 1.1).abs() < 1e-9);

        // Reference untouched, hot source pulled onto the curve.
        assert_eq!(set.graph(0).unwrap().points()[0].y, 100.0);
        assert!((set.graph(1).unwrap().points()[0].y - 100.0).abs() < 1e-9);
        assert!((set.graph(1).unwrap().points()[0].y_err - 1.0 / 1.1).abs() < 1e-9);
        assert_consistent(&set);
        assert!(!set.residual_set());
    }

    #[test]
    fn scale_of_on_curve_source_is_unity() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 50.0, 0.1, 0.5), pt(3.0, 150.0, 0.1, 0.5)], "ref")
            .unwrap();
        set.add(&[pt(2.0, 100.0, 0.1, 0.5), pt(4.0, 200.0, 0.1, 0.5)], "ok")
            .unwrap();
        set.attach_fit(line(0.0, 50.0));

        let factors = set.scale().unwrap();
        assert!((factors[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn residuals_match_definition_everywhere() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 10.5, 0.1, 0.5), pt(2.0, 19.5, 0.1, 0.5)], "A")
            .unwrap();
        set.add(&[pt(3.0, 31.0, 0.1, 0.6)], "B").unwrap();
        let f = line(0.0, 10.0);
        set.attach_fit(f.clone());
        set.set_residual(false).unwrap();
        assert!(set.residual_set());

        assert_eq!(set.total_residual_points().len(), set.n());
        for (i, p) in set.total_points().iter().enumerate() {
            let r = set.total_residual_points()[i];
            assert_eq!(r.y, p.y - f.eval(p.x));
            assert_eq!(r.x, p.x);
            assert_eq!(r.x_err, p.x_err);
            assert_eq!(r.y_err, p.y_err);
        }
        for sid in 0..set.number_of_graphs() {
            let g = set.graph(sid).unwrap();
            let rg = set.residual(sid).unwrap();
            assert_eq!(g.len(), rg.len());
            for (p, r) in g.points().iter().zip(rg.points().iter()) {
                assert_eq!(r.y, p.y - f.eval(p.x));
            }
        }
    }

    #[test]
    fn set_residual_is_a_noop_unless_forced() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 10.0, 0.1, 0.5)], "A").unwrap();
        set.attach_fit(line(0.0, 10.0));
        set.set_residual(false).unwrap();
        let once = set.clone();

        set.set_residual(false).unwrap();
        assert_eq!(set, once);

        set.set_residual(true).unwrap();
        assert_eq!(set, once);
    }

    #[test]
    fn fit_attaches_function_and_marks_residuals_stale() {
        let mut set = CalibrationGraphSet::new();
        set.add(
            &[pt(100.0, 200.0, 0.1, 0.5), pt(200.0, 400.0, 0.1, 0.5), pt(300.0, 600.0, 0.1, 0.5)],
            "A",
        )
        .unwrap();

        let f = set.fit(ModelKind::Linear).unwrap().clone();
        assert!((f.params[0]).abs() < 1e-6);
        assert!((f.params[1] - 2.0).abs() < 1e-9);

        set.set_residual(false).unwrap();
        assert!(set.residual_set());

        // Refit invalidates residuals.
        set.fit(ModelKind::Linear).unwrap();
        assert!(!set.residual_set());
    }

    #[test]
    fn fit_on_empty_set_fails() {
        let mut set = CalibrationGraphSet::new();
        assert!(matches!(set.fit(ModelKind::Linear), Err(CalError::Fit(_))));
    }

    #[test]
    fn scale_then_refit_converges_on_synthetic_gain_mismatch() {
        // Reference source on y = 2x, second source with gain 1.05.
        let mut set = CalibrationGraphSet::new();
        let reference: Vec<CalibrationPoint> =
            (1..=5).map(|i| pt(i as f64 * 100.0, i as f64 * 200.0, 0.1, 1.0)).collect();
        let skewed: Vec<CalibrationPoint> = (1..=5)
            .map(|i| pt(i as f64 * 110.0, i as f64 * 110.0 * 2.0 * 1.05, 0.1, 1.0))
            .collect();
        set.add(&reference, "ref").unwrap();
        set.add(&skewed, "skewed").unwrap();

        // The joint fit is pulled between the two sources, so each pass only
        // shrinks the mismatch geometrically; iterate until it is gone.
        set.fit(ModelKind::Linear).unwrap();
        let mut last = f64::INFINITY;
        for _ in 0..50 {
            let factors = set.scale().unwrap();
            set.fit(ModelKind::Linear).unwrap();
            last = factors[1];
            if (last - 1.0).abs() < 1e-9 {
                break;
            }
        }
        assert!((last - 1.0).abs() < 1e-9);

        // The skewed source ends up on the joint line.
        let f = set.fit_function().unwrap().clone();
        for p in set.graph(1).unwrap().points() {
            assert!((p.y - f.eval(p.x)).abs() < 1e-3);
        }
        assert_consistent(&set);
    }

    #[test]
    fn invariants_hold_under_mixed_operation_sequences() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 2.0, 0.0, 0.1), pt(2.0, 4.0, 0.0, 0.1)], "A")
            .unwrap();
        assert_consistent(&set);
        set.add(&[pt(3.0, 6.0, 0.0, 0.1), pt(4.0, 8.0, 0.0, 0.1), pt(5.0, 10.0, 0.0, 0.1)], "B")
            .unwrap();
        assert_consistent(&set);
        set.remove_point(0).unwrap();
        assert_consistent(&set);
        set.add(&[pt(6.0, 12.0, 0.0, 0.1)], "C").unwrap();
        assert_consistent(&set);
        set.remove_point(3).unwrap();
        assert_consistent(&set);
        set.attach_fit(line(0.0, 2.0));
        set.scale().unwrap();
        assert_consistent(&set);
        set.reset_total_graph();
        assert_consistent(&set);
    }

    #[test]
    fn style_setters_keep_both_views_in_sync() {
        let mut set = CalibrationGraphSet::new();
        set.add(&[pt(1.0, 1.0, 0.0, 0.1)], "A").unwrap();
        set.set_marker_color(0, 7);
        set.set_line_color(0, 9);
        assert_eq!(set.graph(0).unwrap().style().marker_color, 7);
        assert_eq!(set.residual(0).unwrap().style().marker_color, 7);
        assert_eq!(set.graph(0).unwrap().style().line_color, 9);
        assert_eq!(set.residual(0).unwrap().style().line_color, 9);
    }
}
