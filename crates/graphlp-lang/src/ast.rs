use crate::lexer::Span;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Variable(VariableDecl),
    Objective(ObjectiveDecl),
    Constraint(ConstraintDecl),
}

/// `var x0 "Trousers (units/day)"`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub span: Span,
    pub name: String,
    pub description: Option<String>,
}

/// `max 3 x0 + 2 x1`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveDecl {
    pub span: Span,
    pub sense: SenseKeyword,
    pub expr: Expr,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseKeyword {
    Max,
    Min,
}

/// `cloth "Metres of cloth": 2 x0 + x1 <= 10`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDecl {
    pub span: Span,
    pub label: Option<String>,
    pub description: Option<String>,
    pub expr: Expr,
    pub relation: RelationKeyword,
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKeyword {
    Le,
    Ge,
    Eq,
}

/// A linear expression: sum of `coefficient * variable` terms
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub span: Span,
    pub terms: Vec<Term>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    pub coefficient: f64,
    pub variable: String,
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Variable(v) => v.span,
            Item::Objective(o) => o.span,
            Item::Constraint(c) => c.span,
        }
    }
}
