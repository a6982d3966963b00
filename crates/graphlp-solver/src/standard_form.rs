use crate::problem::{Constraint, Objective, Relation, Sense};

/// Matrix form consumed by a minimizing LP routine.
///
/// All inequality rows are `<=`; `c` is already negated for maximization.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StandardForm {
    pub a_ub: Vec<[f64; 2]>,
    pub b_ub: Vec<f64>,
    pub a_eq: Vec<[f64; 2]>,
    pub b_eq: Vec<f64>,
    pub c: [f64; 2],
}

impl StandardForm {
    /// Translate user constraints and objective into standard form.
    ///
    /// `>=` rows are flipped into `<=` rows by negating coefficients and rhs.
    /// No solvability checks happen here.
    pub fn build(constraints: &[Constraint], objective: &Objective) -> Self {
        let mut form = StandardForm::default();

        for c in constraints {
            match c.relation {
                Relation::Le => {
                    form.a_ub.push([c.coeff_a, c.coeff_b]);
                    form.b_ub.push(c.rhs);
                }
                Relation::Ge => {
                    form.a_ub.push([-c.coeff_a, -c.coeff_b]);
                    form.b_ub.push(-c.rhs);
                }
                Relation::Eq => {
                    form.a_eq.push([c.coeff_a, c.coeff_b]);
                    form.b_eq.push(c.rhs);
                }
            }
        }

        // The routine minimizes
        form.c = match objective.sense {
            Sense::Max => [-objective.coeff_a, -objective.coeff_b],
            Sense::Min => [objective.coeff_a, objective.coeff_b],
        };

        tracing::debug!(
            ub_rows = form.a_ub.len(),
            eq_rows = form.a_eq.len(),
            c = ?form.c,
            "built standard form"
        );
        form
    }

    pub fn num_rows(&self) -> usize {
        self.a_ub.len() + self.a_eq.len()
    }
}
