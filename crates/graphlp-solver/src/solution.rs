use crate::problem::Point;

/// Full outcome of a solve, in the caller's optimization sense
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolveStatus,
    /// Optimal point; only present when `status` is `Optimal`
    pub point: Option<Point>,
    /// Optimal objective value, already translated back to MAX/MIN
    pub objective_value: f64,
    /// Indices of constraints that hold with equality at the optimum
    pub binding: Vec<usize>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// An optimal solution was found
    Optimal,
    /// No point satisfies all constraints
    Infeasible,
    /// The objective improves without limit
    Unbounded,
    /// The routine gave up before proving optimality
    IterationLimit,
}

/// UI-facing view of a [`Solution`]: every non-optimal outcome collapses to
/// `feasible == false`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveResult {
    pub feasible: bool,
    pub optimal_value: f64,
    pub optimal_point: Option<Point>,
}

impl Solution {
    pub fn optimal(point: Point, objective_value: f64) -> Self {
        Self {
            status: SolveStatus::Optimal,
            point: Some(point),
            objective_value,
            binding: Vec::new(),
        }
    }

    pub fn infeasible() -> Self {
        Self::without_point(SolveStatus::Infeasible, f64::NAN)
    }

    pub fn unbounded() -> Self {
        Self::without_point(SolveStatus::Unbounded, f64::NAN)
    }

    pub fn iteration_limit() -> Self {
        Self::without_point(SolveStatus::IterationLimit, f64::NAN)
    }

    fn without_point(status: SolveStatus, objective_value: f64) -> Self {
        Self {
            status,
            point: None,
            objective_value,
            binding: Vec::new(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Collapse to the boolean result shown to users
    pub fn to_result(&self) -> SolveResult {
        match (self.status, self.point) {
            (SolveStatus::Optimal, Some(point)) => SolveResult {
                feasible: true,
                optimal_value: self.objective_value,
                optimal_point: Some(point),
            },
            _ => SolveResult {
                feasible: false,
                optimal_value: f64::NAN,
                optimal_point: None,
            },
        }
    }
}

impl SolveStatus {
    /// Message suitable for display next to a failed solve
    pub fn message(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "Optimal solution found.",
            SolveStatus::Infeasible => "No point satisfies all constraints.",
            SolveStatus::Unbounded => "The objective can be improved without limit.",
            SolveStatus::IterationLimit => "The solver stopped at its iteration limit.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_optimal_statuses_collapse() {
        for solution in [Solution::infeasible(), Solution::unbounded(), Solution::iteration_limit()] {
            let result = solution.to_result();
            assert!(!result.feasible);
            assert!(result.optimal_point.is_none());
        }
        assert_ne!(Solution::infeasible().status, Solution::unbounded().status);
    }

    #[test]
    fn test_optimal_to_result() {
        let result = Solution::optimal(Point::new(0.0, 10.0), 20.0).to_result();
        assert!(result.feasible);
        assert_eq!(result.optimal_value, 20.0);
        assert_eq!(result.optimal_point, Some(Point::new(0.0, 10.0)));
    }
}
