use crate::geometry::{FeasiblePolygon, RegionBuilder, Segment, Window, boundary_segment};
use crate::problem::{Model, Point};
use crate::solution::Solution;

/// Everything a renderer needs to draw a two-variable model
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub window: Window,
    pub polygon: FeasiblePolygon,
    pub boundaries: Vec<BoundaryLine>,
    pub optimum: Option<Point>,
}

/// Boundary line of one constraint, for overlaying on the region
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLine {
    /// Index into `Model::constraints`
    pub constraint: usize,
    /// Legend text, e.g. `R1: 2x0 + 1x1 <= 10`
    pub label: String,
    /// `None` when the line misses the window
    pub segment: Option<Segment>,
}

impl Plot {
    /// Assemble the plot for `model`.
    ///
    /// Without an explicit `window` the window is fit to the optimum.
    pub fn build(
        model: &Model,
        solution: Option<&Solution>,
        region: &RegionBuilder,
        window: Option<Window>,
    ) -> Self {
        let result = solution.map(Solution::to_result);
        let window = window
            .or_else(|| result.as_ref().map(Window::fit_to))
            .unwrap_or_default();

        let polygon = region.compute(&model.constraints, window);
        let names = model.variable_names();
        let boundaries = model
            .constraints
            .iter()
            .enumerate()
            .map(|(i, c)| BoundaryLine {
                constraint: i,
                label: format!("{}: {}", model.constraint_name(i), c.describe(names)),
                segment: boundary_segment(c, window),
            })
            .collect();

        Plot {
            window,
            polygon,
            boundaries,
            optimum: result.and_then(|r| r.optimal_point),
        }
    }
}
