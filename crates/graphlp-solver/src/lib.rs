pub mod geometry;
mod plot;
mod problem;
mod simplex;
mod solution;
mod solver;
mod standard_form;

pub use geometry::{FeasiblePolygon, RegionBuilder, Segment, Window, compute_polygon};
pub use plot::{BoundaryLine, Plot};
pub use problem::{Constraint, MAX_CONSTRAINTS, Model, ModelError, Objective, Point, Relation, Sense, Variable};
pub use simplex::{LpRoutine, RoutineOutcome, Simplex};
pub use solution::{SolveResult, SolveStatus, Solution};
pub use solver::Solver;
pub use standard_form::StandardForm;
