use std::fmt;

use thiserror::Error;

/// Maximum number of constraints a model may hold
pub const MAX_CONSTRAINTS: usize = 5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("A model needs at least one constraint")]
    NoConstraints,
    #[error("Too many constraints: at most {MAX_CONSTRAINTS} are supported")]
    TooManyConstraints,
    #[error("Non-finite value in {0}")]
    NonFinite(String),
}

/// A two-variable linear program: objective plus 1..=5 constraints
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Decision variables X0 and X1
    pub variables: [Variable; 2],
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Free-form description shown next to the value (e.g. "Shirts (units/day)")
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    pub coeff_a: f64,
    pub coeff_b: f64,
    pub sense: Sense,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Max,
    Min,
}

/// `coeff_a * X0 + coeff_b * X1 <relation> rhs`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub coeff_a: f64,
    pub coeff_b: f64,
    pub relation: Relation,
    pub rhs: f64,
    /// Short name for diagnostics
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

/// A point in the (X0, X1) plane
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Objective {
    pub fn new(coeff_a: f64, coeff_b: f64, sense: Sense) -> Self {
        Self { coeff_a, coeff_b, sense }
    }

    pub fn maximize(coeff_a: f64, coeff_b: f64) -> Self {
        Self::new(coeff_a, coeff_b, Sense::Max)
    }

    pub fn minimize(coeff_a: f64, coeff_b: f64) -> Self {
        Self::new(coeff_a, coeff_b, Sense::Min)
    }

    pub fn value_at(&self, point: Point) -> f64 {
        self.coeff_a * point.x + self.coeff_b * point.y
    }
}

impl Constraint {
    pub fn new(coeff_a: f64, coeff_b: f64, relation: Relation, rhs: f64) -> Self {
        Self {
            coeff_a,
            coeff_b,
            relation,
            rhs,
            label: None,
            description: None,
        }
    }

    pub fn le(coeff_a: f64, coeff_b: f64, rhs: f64) -> Self {
        Self::new(coeff_a, coeff_b, Relation::Le, rhs)
    }

    pub fn ge(coeff_a: f64, coeff_b: f64, rhs: f64) -> Self {
        Self::new(coeff_a, coeff_b, Relation::Ge, rhs)
    }

    pub fn equal(coeff_a: f64, coeff_b: f64, rhs: f64) -> Self {
        Self::new(coeff_a, coeff_b, Relation::Eq, rhs)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Left-hand side evaluated at `point`
    pub fn lhs(&self, point: Point) -> f64 {
        self.coeff_a * point.x + self.coeff_b * point.y
    }

    /// Whether `point` satisfies the relation within an absolute tolerance
    pub fn is_satisfied(&self, point: Point, tolerance: f64) -> bool {
        let value = self.lhs(point);
        match self.relation {
            Relation::Le => value <= self.rhs + tolerance,
            Relation::Ge => value >= self.rhs - tolerance,
            Relation::Eq => (value - self.rhs).abs() <= tolerance,
        }
    }

    /// Human-readable form, e.g. `2x0 + 1x1 <= 10`
    pub fn describe(&self, names: [&str; 2]) -> String {
        let sign = if self.coeff_b < 0.0 { '-' } else { '+' };
        format!(
            "{}{} {} {}{} {} {}",
            self.coeff_a,
            names[0],
            sign,
            self.coeff_b.abs(),
            names[1],
            self.relation,
            self.rhs
        )
    }
}

impl Model {
    /// Empty model over `x0`, `x1` with the given objective
    pub fn new(objective: Objective) -> Self {
        Self {
            variables: [Variable::new("x0"), Variable::new("x1")],
            objective,
            constraints: Vec::new(),
        }
    }

    pub fn with_variables(mut self, x0: Variable, x1: Variable) -> Self {
        self.variables = [x0, x1];
        self
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        if self.constraints.len() >= MAX_CONSTRAINTS {
            return Err(ModelError::TooManyConstraints);
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// Check the shape invariants a solve relies on
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.constraints.is_empty() {
            return Err(ModelError::NoConstraints);
        }
        if self.constraints.len() > MAX_CONSTRAINTS {
            return Err(ModelError::TooManyConstraints);
        }
        if !self.objective.coeff_a.is_finite() || !self.objective.coeff_b.is_finite() {
            return Err(ModelError::NonFinite("objective".to_string()));
        }
        for (i, c) in self.constraints.iter().enumerate() {
            if !(c.coeff_a.is_finite() && c.coeff_b.is_finite() && c.rhs.is_finite()) {
                return Err(ModelError::NonFinite(self.constraint_name(i)));
            }
        }
        Ok(())
    }

    /// Label of the i-th constraint, falling back to `R{i+1}`
    pub fn constraint_name(&self, index: usize) -> String {
        self.constraints
            .get(index)
            .and_then(|c| c.label.clone())
            .unwrap_or_else(|| format!("R{}", index + 1))
    }

    pub fn variable_names(&self) -> [&str; 2] {
        [&self.variables[0].name, &self.variables[1].name]
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
