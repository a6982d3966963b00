use graphlp_solver::{Constraint, Model, ModelError, Objective, Relation, Sense, Variable};
use thiserror::Error;

use crate::ast::*;
use crate::parser::{ParseError, Parser};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Variable declared twice: {0}")]
    DuplicateVariable(String),
    #[error("Too many variables: only two decision variables are supported, found {0}")]
    TooManyVariables(String),
    #[error("Missing objective: add a `max ...` or `min ...` line")]
    MissingObjective,
    #[error("Only one objective is allowed")]
    DuplicateObjective,
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Compiler for turning a parsed program into a validated [`Model`]
#[derive(Debug, Default)]
pub struct Compiler {
    variables: Vec<Variable>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&mut self, program: &Program) -> Result<Model, CompileError> {
        self.variables.clear();
        for item in &program.items {
            if let Item::Variable(decl) = item {
                self.declare(decl)?;
            }
        }
        if self.variables.is_empty() {
            self.variables = vec![Variable::new("x0"), Variable::new("x1")];
        }
        // A single declared variable still gets a partner; a lone `x1` stays second
        if self.variables.len() == 1 {
            if self.variables[0].name == "x1" {
                self.variables.insert(0, Variable::new("x0"));
            } else {
                self.variables.push(Variable::new("x1"));
            }
        }

        let mut objective = None;
        let mut constraints = Vec::new();
        for item in &program.items {
            match item {
                Item::Variable(_) => {}
                Item::Objective(decl) => {
                    if objective.is_some() {
                        return Err(CompileError::DuplicateObjective);
                    }
                    let [a, b] = self.coefficients(&decl.expr)?;
                    let sense = match decl.sense {
                        SenseKeyword::Max => Sense::Max,
                        SenseKeyword::Min => Sense::Min,
                    };
                    objective = Some(Objective::new(a, b, sense));
                }
                Item::Constraint(decl) => constraints.push(self.constraint(decl)?),
            }
        }

        let objective = objective.ok_or(CompileError::MissingObjective)?;
        let mut model = Model::new(objective)
            .with_variables(self.variables[0].clone(), self.variables[1].clone());
        for c in constraints {
            model.add_constraint(c)?;
        }
        model.validate()?;

        tracing::debug!(
            variables = ?model.variable_names(),
            constraints = model.num_constraints(),
            "compiled model"
        );
        Ok(model)
    }

    fn declare(&mut self, decl: &VariableDecl) -> Result<(), CompileError> {
        if self.variables.iter().any(|v| v.name == decl.name) {
            return Err(CompileError::DuplicateVariable(decl.name.clone()));
        }
        if self.variables.len() == 2 {
            return Err(CompileError::TooManyVariables(decl.name.clone()));
        }
        let mut variable = Variable::new(decl.name.clone());
        variable.description = decl.description.clone();
        self.variables.push(variable);
        Ok(())
    }

    fn constraint(&self, decl: &ConstraintDecl) -> Result<Constraint, CompileError> {
        let [a, b] = self.coefficients(&decl.expr)?;
        let relation = match decl.relation {
            RelationKeyword::Le => Relation::Le,
            RelationKeyword::Ge => Relation::Ge,
            RelationKeyword::Eq => Relation::Eq,
        };
        let mut constraint = Constraint::new(a, b, relation, decl.rhs);
        constraint.label = decl.label.clone();
        constraint.description = decl.description.clone();
        Ok(constraint)
    }

    /// Accumulate terms into `[coeff_x0, coeff_x1]`
    fn coefficients(&self, expr: &Expr) -> Result<[f64; 2], CompileError> {
        let mut coeffs = [0.0; 2];
        for term in &expr.terms {
            let index = self
                .variables
                .iter()
                .position(|v| v.name == term.variable)
                .ok_or_else(|| CompileError::UnknownVariable(term.variable.clone()))?;
            coeffs[index] += term.coefficient;
        }
        Ok(coeffs)
    }
}

/// Parse and compile model source in one step
pub fn compile_source(source: &str) -> Result<Model, CompileError> {
    let program = Parser::parse(source)?;
    Compiler::new().compile(&program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphlp_solver::{SolveStatus, Solver};

    #[test]
    fn test_compile_model() {
        let source = r#"
            var x0 "Trousers (units/day)"
            var x1 "Shirts (units/day)"
            max 3 x0 + 2 x1
            cloth "Metres of cloth": 2 x0 + x1 <= 10
            x0 + x1 - x0 >= 1
        "#;
        let model = compile_source(source).unwrap();

        assert_eq!(model.variables[0].description.as_deref(), Some("Trousers (units/day)"));
        assert_eq!(model.objective, Objective::maximize(3.0, 2.0));
        assert_eq!(model.constraints.len(), 2);
        assert_eq!(model.constraints[0].label.as_deref(), Some("cloth"));
        assert_eq!(model.constraints[0].description.as_deref(), Some("Metres of cloth"));
        assert_eq!((model.constraints[0].coeff_a, model.constraints[0].coeff_b), (2.0, 1.0));
        // Repeated variables accumulate
        assert_eq!((model.constraints[1].coeff_a, model.constraints[1].coeff_b), (0.0, 1.0));
        assert_eq!(model.constraints[1].relation, Relation::Ge);
    }

    #[test]
    fn test_default_variable_names() {
        let model = compile_source("min x0 + x1\nx0 + x1 >= 2").unwrap();
        assert_eq!(model.variable_names(), ["x0", "x1"]);
        assert_eq!(model.objective.sense, Sense::Min);
    }

    #[test]
    fn test_custom_variable_names() {
        let model = compile_source("var trousers\nvar shirts\nmax 3 trousers + 2 shirts\ntrousers <= 4").unwrap();
        assert_eq!(model.variable_names(), ["trousers", "shirts"]);
        assert_eq!(model.constraints[0].coeff_a, 1.0);

        let err = compile_source("var a\nvar b\nmax a + c\na <= 1").unwrap_err();
        assert_eq!(err, CompileError::UnknownVariable("c".to_string()));
    }

    #[test]
    fn test_single_declared_variable_keeps_its_axis() {
        let model = compile_source("var x1 \"Shirts\"\nmax x0 + 2 x1\nx1 <= 4").unwrap();
        assert_eq!(model.variable_names(), ["x0", "x1"]);
        assert_eq!(model.variables[1].description.as_deref(), Some("Shirts"));
        assert_eq!(model.objective, Objective::maximize(1.0, 2.0));
        assert_eq!((model.constraints[0].coeff_a, model.constraints[0].coeff_b), (0.0, 1.0));

        let model = compile_source("var trousers\nmax trousers + x1\ntrousers <= 4").unwrap();
        assert_eq!(model.variable_names(), ["trousers", "x1"]);
    }

    #[test]
    fn test_variable_errors() {
        assert_eq!(
            compile_source("var a\nvar b\nvar c\nmax a\na <= 1").unwrap_err(),
            CompileError::TooManyVariables("c".to_string())
        );
        assert_eq!(
            compile_source("var a\nvar a\nmax a\na <= 1").unwrap_err(),
            CompileError::DuplicateVariable("a".to_string())
        );
    }

    #[test]
    fn test_objective_errors() {
        assert_eq!(compile_source("x0 <= 1").unwrap_err(), CompileError::MissingObjective);
        assert_eq!(
            compile_source("max x0\nmin x1\nx0 <= 1").unwrap_err(),
            CompileError::DuplicateObjective
        );
    }

    #[test]
    fn test_constraint_count_limits() {
        assert_eq!(
            compile_source("max x0").unwrap_err(),
            CompileError::Model(ModelError::NoConstraints)
        );
        let six = "max x0\nx0 <= 1\nx0 <= 2\nx0 <= 3\nx0 <= 4\nx0 <= 5\nx0 <= 6";
        assert_eq!(
            compile_source(six).unwrap_err(),
            CompileError::Model(ModelError::TooManyConstraints)
        );
    }

    #[test]
    fn test_parse_errors_are_wrapped() {
        assert!(matches!(compile_source("max x0 +"), Err(CompileError::Parse(_))));
    }

    #[test]
    fn test_compile_and_solve() {
        let model = compile_source("max 3 x0 + 2 x1\nx0 + x1 <= 4\nx0 <= 3\nx1 <= 3").unwrap();
        let solution = Solver::new().solve_model(&model);

        assert_eq!(solution.status, SolveStatus::Optimal);
        let point = solution.point.unwrap();
        assert!((point.x - 3.0).abs() < 1e-6, "x0 = {} (expected 3)", point.x);
        assert!((point.y - 1.0).abs() < 1e-6, "x1 = {} (expected 1)", point.y);
        assert!((solution.objective_value - 11.0).abs() < 1e-6);
    }
}
