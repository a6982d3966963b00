//! WASM bindings for graphlp
//!
//! JavaScript-friendly entry points for a browser editor that solves and
//! draws a model as the user types.

use wasm_bindgen::prelude::*;

use crate::compiler::{CompileError, compile_source};
use crate::lexer::{Lexer, TokenKind};
use crate::parser::Parser;
use graphlp_solver::{Plot, RegionBuilder, SolveStatus, Solver, Window};

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse source code and return the AST as JSON
#[wasm_bindgen]
pub fn parse(source: &str) -> Result<JsValue, JsValue> {
    let program = Parser::parse(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&program)
}

/// Tokenize source code and return tokens as JSON
#[wasm_bindgen]
pub fn tokenize(source: &str) -> Result<JsValue, JsValue> {
    let tokens: Vec<TokenInfo> = Lexer::tokenize(source)
        .into_iter()
        .map(|t| TokenInfo {
            kind: format!("{:?}", t.kind),
            token_type: token_type(t.kind),
            text: t.text,
            start: t.span.start,
            end: t.span.end,
        })
        .collect();
    to_js(&tokens)
}

#[derive(serde::Serialize)]
struct TokenInfo {
    kind: String,
    /// Highlighting class
    token_type: &'static str,
    text: String,
    start: usize,
    end: usize,
}

fn token_type(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Var | TokenKind::Max | TokenKind::Min => "keyword",
        TokenKind::Ident => "variable",
        TokenKind::Number => "number",
        TokenKind::String => "string",
        TokenKind::Comment => "comment",
        TokenKind::Plus | TokenKind::Minus | TokenKind::Star => "operator",
        TokenKind::Le | TokenKind::Ge | TokenKind::Eq => "operator",
        TokenKind::Colon | TokenKind::Semicolon => "delimiter",
        TokenKind::Newline => "whitespace",
        TokenKind::Error | TokenKind::Eof => "error",
    }
}

/// Validate source code and return diagnostics as JSON
#[wasm_bindgen]
pub fn validate(source: &str) -> JsValue {
    let diagnostics = get_diagnostics(source);
    serde_wasm_bindgen::to_value(&diagnostics).unwrap_or(JsValue::NULL)
}

#[derive(serde::Serialize)]
struct Diagnostic {
    start: usize,
    end: usize,
    severity: String,
    message: String,
}

fn get_diagnostics(source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for token in Lexer::tokenize(source) {
        if token.kind == TokenKind::Error {
            diagnostics.push(Diagnostic {
                start: token.span.start,
                end: token.span.end,
                severity: "error".to_string(),
                message: format!("Unexpected character '{}'", token.text),
            });
        }
    }

    if let Err(e) = compile_source(source) {
        let span = match &e {
            CompileError::Parse(parse) => parse.span(),
            _ => None,
        };
        // Lexer errors already carry a precise location
        let duplicate = span.is_some_and(|s| diagnostics.iter().any(|d| d.start == s.start));
        if !duplicate {
            diagnostics.push(Diagnostic {
                start: span.map_or(0, |s| s.start),
                end: span.map_or(source.len(), |s| s.end),
                severity: "error".to_string(),
                message: e.to_string(),
            });
        }
    }

    diagnostics
}

/// Solve the model and return the solution as JSON
#[wasm_bindgen]
pub fn solve(source: &str) -> Result<JsValue, JsValue> {
    let model = compile_source(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let solution = Solver::new().solve_model(&model);
    let result = solution.to_result();

    let response = SolveResponse {
        status: match solution.status {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::IterationLimit => "iteration_limit",
        },
        message: solution.status.message(),
        feasible: result.feasible,
        optimal_value: result.feasible.then_some(result.optimal_value),
        optimal_point: result.optimal_point.map(|p| [p.x, p.y]),
        binding: solution
            .binding
            .iter()
            .map(|&i| model.constraint_name(i))
            .collect(),
    };
    to_js(&response)
}

#[derive(serde::Serialize)]
struct SolveResponse {
    status: &'static str,
    message: &'static str,
    feasible: bool,
    optimal_value: Option<f64>,
    optimal_point: Option<[f64; 2]>,
    binding: Vec<String>,
}

/// Solve the model and return everything needed to draw it: window,
/// feasible polygon, boundary lines and the optimum.
///
/// `window` overrides the automatic fit when given; `clip` closes regions
/// that are only bounded by the window.
#[wasm_bindgen]
pub fn feasible_region(source: &str, window: Option<f64>, clip: bool) -> Result<JsValue, JsValue> {
    let model = compile_source(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let solution = Solver::new().solve_model(&model);
    let region = RegionBuilder::new().with_window_edges(clip);
    let plot = Plot::build(&model, Some(&solution), &region, window.map(Window::square));
    to_js(&plot)
}
