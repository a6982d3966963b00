//! Feasible-region geometry for two-variable models.
//!
//! The region is approximated inside a display window anchored at the origin:
//! candidate vertices come from axis intercepts and pairwise constraint
//! intersections, infeasible candidates are dropped, and the survivors are
//! ordered by angle around their centroid. The region is convex, so that
//! ordering traces its boundary.

use std::cmp::Ordering;

use crate::problem::{Constraint, Objective, Point, Sense};
use crate::solution::SolveResult;

/// Absolute tolerance for the feasibility filter
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Default upper bound of the display window on each axis
pub const DEFAULT_WINDOW_BOUND: f64 = 20.0;

/// Candidates this close are the same vertex
const DEDUP_EPS: f64 = 1e-9;

/// Rounding slack for the window membership test
const WINDOW_SLACK: f64 = 1e-9;

/// Display window `[0, x_max] x [0, y_max]`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub x_max: f64,
    pub y_max: f64,
}

impl Default for Window {
    fn default() -> Self {
        Self::square(DEFAULT_WINDOW_BOUND)
    }
}

impl Window {
    pub fn new(x_max: f64, y_max: f64) -> Self {
        Self { x_max, y_max }
    }

    pub fn square(bound: f64) -> Self {
        Self::new(bound, bound)
    }

    /// Default window, widened to twice the optimum's X0 when that is larger
    pub fn fit_to(result: &SolveResult) -> Self {
        match result.optimal_point {
            Some(p) if result.feasible => Self::square(DEFAULT_WINDOW_BOUND.max(p.x * 2.0)),
            _ => Self::default(),
        }
    }

    /// Membership with rounding slack; returns the point clamped into the window
    fn admit(&self, p: Point) -> Option<Point> {
        let inside = |v: f64, max: f64| v >= -WINDOW_SLACK && v <= max + WINDOW_SLACK;
        if inside(p.x, self.x_max) && inside(p.y, self.y_max) {
            Some(Point::new(p.x.clamp(0.0, self.x_max), p.y.clamp(0.0, self.y_max)))
        } else {
            None
        }
    }

    /// The four window edges as constraints
    fn edges(&self) -> [Constraint; 4] {
        [
            Constraint::ge(1.0, 0.0, 0.0),
            Constraint::ge(0.0, 1.0, 0.0),
            Constraint::le(1.0, 0.0, self.x_max),
            Constraint::le(0.0, 1.0, self.y_max),
        ]
    }
}

/// Ordered polygon boundary; empty when the region cannot be drawn
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeasiblePolygon {
    pub vertices: Vec<Point>,
}

impl FeasiblePolygon {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn contains_vertex(&self, p: Point, eps: f64) -> bool {
        self.vertices
            .iter()
            .any(|v| (v.x - p.x).abs() <= eps && (v.y - p.y).abs() <= eps)
    }

    /// Shoelace area; positive for counter-clockwise order
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        sum / 2.0
    }
}

/// Straight segment between two points
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Settings for feasible-region computation
#[derive(Debug, Clone, Copy)]
pub struct RegionBuilder {
    tolerance: f64,
    singular_tolerance: f64,
    window_edges: bool,
}

impl Default for RegionBuilder {
    fn default() -> Self {
        Self {
            tolerance: FEASIBILITY_TOLERANCE,
            singular_tolerance: 0.0,
            window_edges: false,
        }
    }
}

impl RegionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute tolerance for the feasibility filter
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Treat constraint pairs with `|det| <= eps` as parallel.
    ///
    /// The default of `0.0` only skips exactly singular pairs.
    pub fn with_singular_tolerance(mut self, eps: f64) -> Self {
        self.singular_tolerance = eps;
        self
    }

    /// Also intersect constraints with the window edges, so regions that are
    /// only closed off by the window still produce a polygon
    pub fn with_window_edges(mut self, enabled: bool) -> Self {
        self.window_edges = enabled;
        self
    }

    /// Axis intercepts and pairwise intersections inside `window`
    pub fn candidates(&self, constraints: &[Constraint], window: Window) -> Vec<Point> {
        let mut points = Vec::new();

        for c in constraints {
            if c.coeff_a != 0.0 {
                points.extend(window.admit(Point::new(c.rhs / c.coeff_a, 0.0)));
            }
            if c.coeff_b != 0.0 {
                points.extend(window.admit(Point::new(0.0, c.rhs / c.coeff_b)));
            }
        }

        let edges = window.edges();
        let mut lines: Vec<&Constraint> = constraints.iter().collect();
        if self.window_edges {
            lines.extend(edges.iter());
        }

        for i in 0..lines.len() {
            for j in (i + 1)..lines.len() {
                if let Some(p) = intersect(lines[i], lines[j], self.singular_tolerance) {
                    points.extend(window.admit(p));
                }
            }
        }

        let points = dedup(points);
        tracing::trace!(count = points.len(), "generated candidates");
        points
    }

    /// Keep the points that satisfy every constraint within tolerance
    pub fn filter_feasible(&self, constraints: &[Constraint], points: &[Point]) -> Vec<Point> {
        points
            .iter()
            .copied()
            .filter(|&p| constraints.iter().all(|c| c.is_satisfied(p, self.tolerance)))
            .collect()
    }

    /// Compute the ordered feasible polygon within `window`
    pub fn compute(&self, constraints: &[Constraint], window: Window) -> FeasiblePolygon {
        let candidates = self.candidates(constraints, window);
        let feasible = self.filter_feasible(constraints, &candidates);
        tracing::debug!(
            candidates = candidates.len(),
            feasible = feasible.len(),
            ?window,
            "feasible region"
        );
        order_by_angle(feasible)
    }
}

/// [`RegionBuilder::compute`] with default settings
pub fn compute_polygon(constraints: &[Constraint], window: Window) -> FeasiblePolygon {
    RegionBuilder::default().compute(constraints, window)
}

/// Intersection of the boundary lines of two constraints.
///
/// `None` when `|det| <= singular_tolerance`.
pub fn intersect(c1: &Constraint, c2: &Constraint, singular_tolerance: f64) -> Option<Point> {
    let det = c1.coeff_a * c2.coeff_b - c2.coeff_a * c1.coeff_b;
    if det.abs() <= singular_tolerance {
        return None;
    }
    let x = (c1.rhs * c2.coeff_b - c2.rhs * c1.coeff_b) / det;
    let y = (c1.coeff_a * c2.rhs - c2.coeff_a * c1.rhs) / det;
    Some(Point::new(x, y))
}

/// Sort points by angle around their centroid. Fewer than three points
/// cannot enclose an area and yield an empty polygon.
pub fn order_by_angle(mut points: Vec<Point>) -> FeasiblePolygon {
    if points.len() < 3 {
        return FeasiblePolygon::empty();
    }

    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
    let angle = |p: &Point| (p.y - cy).atan2(p.x - cx);

    points.sort_by(|a, b| angle(a).partial_cmp(&angle(b)).unwrap_or(Ordering::Equal));
    FeasiblePolygon { vertices: points }
}

/// The constraint's boundary line clipped to `window`
pub fn boundary_segment(constraint: &Constraint, window: Window) -> Option<Segment> {
    let (a, b, r) = (constraint.coeff_a, constraint.coeff_b, constraint.rhs);
    let mut hits = Vec::with_capacity(4);

    if b != 0.0 {
        for x in [0.0, window.x_max] {
            hits.extend(window.admit(Point::new(x, (r - a * x) / b)));
        }
    }
    if a != 0.0 {
        for y in [0.0, window.y_max] {
            hits.extend(window.admit(Point::new((r - b * y) / a, y)));
        }
    }

    let hits = dedup(hits);
    let mut best: Option<(f64, Segment)> = None;
    for i in 0..hits.len() {
        for j in (i + 1)..hits.len() {
            let d = (hits[i].x - hits[j].x).powi(2) + (hits[i].y - hits[j].y).powi(2);
            if best.is_none_or(|(bd, _)| d > bd) {
                best = Some((d, Segment { from: hits[i], to: hits[j] }));
            }
        }
    }
    best.map(|(_, s)| s)
}

/// Graphical method: the polygon vertex with the best objective value
pub fn best_vertex(polygon: &FeasiblePolygon, objective: &Objective) -> Option<(Point, f64)> {
    let better = |v: f64, best: f64| match objective.sense {
        Sense::Max => v > best,
        Sense::Min => v < best,
    };
    let mut best: Option<(Point, f64)> = None;
    for &p in &polygon.vertices {
        let v = objective.value_at(p);
        if best.is_none_or(|(_, bv)| better(v, bv)) {
            best = Some((p, v));
        }
    }
    best
}

fn dedup(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        // Adding zero turns -0.0 into 0.0
        let p = Point::new(p.x + 0.0, p.y + 0.0);
        if !out
            .iter()
            .any(|q| (q.x - p.x).abs() <= DEDUP_EPS && (q.y - p.y).abs() <= DEDUP_EPS)
        {
            out.push(p);
        }
    }
    out
}
