use crate::standard_form::StandardForm;

/// A general LP minimizer: `min c·x` s.t. `A_ub x <= b_ub`, `A_eq x = b_eq`, `x >= 0`.
///
/// The adapter only talks to the routine through this trait, so any
/// conforming implementation can stand in for [`Simplex`].
pub trait LpRoutine {
    fn minimize(&self, form: &StandardForm) -> RoutineOutcome;
}

/// Raw outcome reported by an [`LpRoutine`], in the routine's minimizing sense
#[derive(Debug, Clone, PartialEq)]
pub enum RoutineOutcome {
    Optimal { x: [f64; 2], objective: f64 },
    Infeasible,
    Unbounded,
    /// The iteration cap was hit before optimality was proven
    IterationLimit,
}

/// Two-phase tableau simplex over non-negative variables
#[derive(Debug, Clone, Copy)]
pub struct Simplex {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

const N_VARS: usize = 2;

struct Tableau {
    /// Constraint rows followed by the objective row; last column is the RHS
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn n_rows(&self) -> usize {
        self.data.len() - 1
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn rhs_col(&self) -> usize {
        self.n_cols() - 1
    }

    fn art_start(&self) -> usize {
        N_VARS + self.n_slack
    }
}

enum PhaseResult {
    Optimal,
    Unbounded,
    IterationLimit,
}

struct Row {
    coeffs: [f64; 2],
    rhs: f64,
    equality: bool,
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn build_tableau(&self, form: &StandardForm) -> Tableau {
        let rows: Vec<Row> = form
            .a_ub
            .iter()
            .zip(&form.b_ub)
            .map(|(a, &b)| Row { coeffs: *a, rhs: b, equality: false })
            .chain(
                form.a_eq
                    .iter()
                    .zip(&form.b_eq)
                    .map(|(a, &b)| Row { coeffs: *a, rhs: b, equality: true }),
            )
            .collect();

        // Every <= row gets a slack (or a surplus once flipped); flipped <= rows
        // and equalities need an artificial to start from a feasible basis
        let n_slack = form.a_ub.len();
        let n_artificial = rows
            .iter()
            .filter(|r| r.equality || r.rhs < 0.0)
            .count();

        let n_rows = rows.len();
        let total_cols = N_VARS + n_slack + n_artificial + 1;

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; n_rows + 1],
            basic_vars: vec![0; n_rows],
            n_slack,
            n_artificial,
        };

        let mut slack_idx = N_VARS;
        let mut artificial_idx = N_VARS + n_slack;
        let rhs_col = total_cols - 1;

        for (i, row) in rows.iter().enumerate() {
            let flip = row.rhs < 0.0;
            let sign = if flip { -1.0 } else { 1.0 };
            for j in 0..N_VARS {
                tableau.data[i][j] = sign * row.coeffs[j];
            }
            tableau.data[i][rhs_col] = sign * row.rhs;

            if !row.equality {
                tableau.data[i][slack_idx] = sign;
                if !flip {
                    tableau.basic_vars[i] = slack_idx;
                }
                slack_idx += 1;
            }
            if row.equality || flip {
                tableau.data[i][artificial_idx] = 1.0;
                tableau.basic_vars[i] = artificial_idx;
                artificial_idx += 1;
            }
        }

        // Objective row holds reduced costs of max(-c·x); positive entries improve
        for j in 0..N_VARS {
            tableau.data[n_rows][j] = -form.c[j];
        }

        tableau
    }

    fn phase1(&self, tableau: &mut Tableau) -> Result<bool, PhaseResult> {
        let n_rows = tableau.n_rows();
        let n_cols = tableau.n_cols();
        let art_start = tableau.art_start();

        let orig_obj = tableau.data[n_rows].clone();

        // Maximize -sum(artificials)
        for j in 0..n_cols {
            tableau.data[n_rows][j] = 0.0;
        }
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[n_rows][j] = -1.0;
        }
        for i in 0..n_rows {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[n_rows][j] += tableau.data[i][j];
                }
            }
        }

        match self.iterate(tableau, n_cols - 1, "phase1") {
            PhaseResult::Optimal => {}
            // Phase 1 is bounded below by zero; running away means no feasible basis
            PhaseResult::Unbounded => return Ok(false),
            PhaseResult::IterationLimit => return Err(PhaseResult::IterationLimit),
        }

        let rhs_col = tableau.rhs_col();
        for i in 0..n_rows {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col].abs() > self.tolerance {
                return Ok(false);
            }
        }

        self.drive_out_artificials(tableau);

        tableau.data[n_rows] = orig_obj;
        for i in 0..n_rows {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[n_rows][basic];
            if ratio.abs() > self.tolerance {
                for j in 0..n_cols {
                    tableau.data[n_rows][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        Ok(true)
    }

    /// Pivot zero-level artificials out of the basis where a real column allows it
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.art_start();
        for i in 0..tableau.n_rows() {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            if let Some(col) = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                self.pivot(tableau, i, col);
            }
        }
    }

    fn phase2(&self, tableau: &mut Tableau) -> PhaseResult {
        let exclude_from = tableau.art_start();
        self.iterate(tableau, exclude_from, "phase2")
    }

    fn iterate(&self, tableau: &mut Tableau, exclude_from: usize, phase: &str) -> PhaseResult {
        for iteration in 0..self.max_iterations {
            let Some(pivot_col) = self.find_pivot_column(tableau, exclude_from) else {
                return PhaseResult::Optimal;
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return PhaseResult::Unbounded;
            };
            tracing::trace!(phase, iteration, pivot_row, pivot_col, "pivot");
            self.pivot(tableau, pivot_row, pivot_col);
        }
        tracing::warn!(phase, max_iterations = self.max_iterations, "simplex iteration limit reached");
        PhaseResult::IterationLimit
    }

    fn find_pivot_column(&self, tableau: &Tableau, exclude_from: usize) -> Option<usize> {
        let obj_row = tableau.n_rows();

        // Most positive reduced cost
        let mut max_val = self.tolerance;
        let mut max_col = None;
        for j in 0..exclude_from.min(tableau.rhs_col()) {
            if tableau.data[obj_row][j] > max_val {
                max_val = tableau.data[obj_row][j];
                max_col = Some(j);
            }
        }
        max_col
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.rhs_col();

        let mut min_ratio = f64::INFINITY;
        let mut min_row = None;
        for i in 0..tableau.n_rows() {
            let val = tableau.data[i][col];
            if val > self.tolerance {
                // Rounding can leave a degenerate rhs just below zero
                let ratio = tableau.data[i][rhs_col].max(0.0) / val;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }
        min_row
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_cols = tableau.n_cols();
        tableau.basic_vars[row] = col;

        let pivot_val = tableau.data[row][col];
        for j in 0..n_cols {
            tableau.data[row][j] /= pivot_val;
        }

        for i in 0..tableau.data.len() {
            if i != row {
                let factor = tableau.data[i][col];
                if factor != 0.0 {
                    for j in 0..n_cols {
                        tableau.data[i][j] -= factor * tableau.data[row][j];
                    }
                }
            }
        }
    }

    fn extract(&self, tableau: &Tableau, form: &StandardForm) -> RoutineOutcome {
        let rhs_col = tableau.rhs_col();
        let mut x = [0.0; N_VARS];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < N_VARS {
                x[basic] = tableau.data[i][rhs_col];
            }
        }
        let objective = form.c[0] * x[0] + form.c[1] * x[1];
        RoutineOutcome::Optimal { x, objective }
    }
}

impl LpRoutine for Simplex {
    fn minimize(&self, form: &StandardForm) -> RoutineOutcome {
        let mut tableau = self.build_tableau(form);

        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau) {
                Ok(true) => {}
                Ok(false) => return RoutineOutcome::Infeasible,
                Err(_) => return RoutineOutcome::IterationLimit,
            }
        }

        match self.phase2(&mut tableau) {
            PhaseResult::Optimal => self.extract(&tableau, form),
            PhaseResult::Unbounded => RoutineOutcome::Unbounded,
            PhaseResult::IterationLimit => RoutineOutcome::IterationLimit,
        }
    }
}
