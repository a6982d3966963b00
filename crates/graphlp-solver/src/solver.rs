use crate::problem::{Model, Point, Sense};
use crate::simplex::{LpRoutine, RoutineOutcome, Simplex};
use crate::solution::Solution;
use crate::standard_form::StandardForm;

/// Tolerance used to report a constraint as binding
const BINDING_TOLERANCE: f64 = 1e-6;

/// Adapter between a two-variable model and a minimizing [`LpRoutine`].
///
/// One synchronous routine call per solve, no retries.
#[derive(Debug, Clone, Default)]
pub struct Solver<R = Simplex> {
    routine: R,
}

impl Solver<Simplex> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: LpRoutine> Solver<R> {
    pub fn with_routine(routine: R) -> Self {
        Self { routine }
    }

    pub fn routine(&self) -> &R {
        &self.routine
    }

    /// Solve a standard form and translate the result back to `sense`
    pub fn solve(&self, form: &StandardForm, sense: Sense) -> Solution {
        let outcome = self.routine.minimize(form);
        tracing::debug!(?outcome, ?sense, "routine finished");

        match outcome {
            RoutineOutcome::Optimal { x, objective } => {
                let value = match sense {
                    Sense::Max => -objective,
                    Sense::Min => objective,
                };
                Solution::optimal(Point::new(x[0], x[1]), value)
            }
            RoutineOutcome::Infeasible => Solution::infeasible(),
            RoutineOutcome::Unbounded => Solution::unbounded(),
            RoutineOutcome::IterationLimit => Solution::iteration_limit(),
        }
    }

    /// Build the standard form for `model`, solve it, and mark binding constraints
    pub fn solve_model(&self, model: &Model) -> Solution {
        let form = StandardForm::build(&model.constraints, &model.objective);
        let mut solution = self.solve(&form, model.objective.sense);

        if let Some(point) = solution.point {
            solution.binding = model
                .constraints
                .iter()
                .enumerate()
                .filter(|(_, c)| (c.lhs(point) - c.rhs).abs() <= BINDING_TOLERANCE)
                .map(|(i, _)| i)
                .collect();
        }

        tracing::debug!(
            status = ?solution.status,
            objective = solution.objective_value,
            binding = ?solution.binding,
            "solved model"
        );
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Constraint, Objective};
    use crate::solution::SolveStatus;

    /// Routine that replays a fixed outcome
    struct Scripted(RoutineOutcome);

    impl LpRoutine for Scripted {
        fn minimize(&self, _form: &StandardForm) -> RoutineOutcome {
            self.0.clone()
        }
    }

    fn model(objective: Objective, constraints: Vec<Constraint>) -> Model {
        let mut model = Model::new(objective);
        for c in constraints {
            model.add_constraint(c).unwrap();
        }
        model
    }

    #[test]
    fn test_max_value_is_un_negated() {
        let solver = Solver::with_routine(Scripted(RoutineOutcome::Optimal {
            x: [1.0, 2.0],
            objective: -7.0,
        }));
        let form = StandardForm::default();

        let max = solver.solve(&form, Sense::Max);
        assert_eq!(max.objective_value, 7.0);
        let min = solver.solve(&form, Sense::Min);
        assert_eq!(min.objective_value, -7.0);
        assert_eq!(max.point, Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_infeasible_and_unbounded_stay_distinct() {
        let form = StandardForm::default();
        let infeasible = Solver::with_routine(Scripted(RoutineOutcome::Infeasible)).solve(&form, Sense::Max);
        let unbounded = Solver::with_routine(Scripted(RoutineOutcome::Unbounded)).solve(&form, Sense::Max);

        assert_eq!(infeasible.status, SolveStatus::Infeasible);
        assert_eq!(unbounded.status, SolveStatus::Unbounded);
        assert_eq!(infeasible.to_result().feasible, unbounded.to_result().feasible);
    }

    #[test]
    fn test_single_edge_optimum() {
        // Every point on x0 + x1 = 4 is optimal
        let m = model(Objective::maximize(1.0, 1.0), vec![Constraint::le(1.0, 1.0, 4.0)]);
        let solution = Solver::new().solve_model(&m);
        let point = solution.point.unwrap();

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!((solution.objective_value - 4.0).abs() < 1e-6);
        assert!((point.x + point.y - 4.0).abs() < 1e-6);
        assert_eq!(solution.binding, vec![0]);
    }

    #[test]
    fn test_binding_excludes_slack_constraints() {
        let m = model(
            Objective::maximize(3.0, 2.0),
            vec![
                Constraint::le(1.0, 1.0, 4.0),
                Constraint::le(1.0, 0.0, 3.0),
                Constraint::le(0.0, 1.0, 3.0),
            ],
        );
        let solution = Solver::new().solve_model(&m);
        assert!((solution.objective_value - 11.0).abs() < 1e-6);
        assert_eq!(solution.binding, vec![0, 1]);
    }
}
