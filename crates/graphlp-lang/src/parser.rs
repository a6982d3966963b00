use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Constant term on the left-hand side at position {0:?}; move it to the right-hand side")]
    ConstantTerm(Span),
    #[error("Unterminated string at position {0:?}")]
    UnterminatedString(Span),
}

impl ParseError {
    /// Source location of the error, when one is known
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            ParseError::ConstantTerm(span) | ParseError::UnterminatedString(span) => Some(*span),
            ParseError::UnexpectedEof | ParseError::InvalidNumber(_) => None,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn skip_separators(&mut self) {
        while matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Comment | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: if t.text.is_empty() {
                    format!("{:?}", t.kind)
                } else {
                    format!("'{}'", t.text)
                },
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(&format!("{:?}", kind))),
        }
    }

    /// Last token consumed, for closing spans
    fn previous_end(&self, fallback: usize) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(fallback)
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();

        loop {
            self.skip_separators();

            let item = match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Var => Item::Variable(self.parse_variable()?),
                TokenKind::Max | TokenKind::Min => Item::Objective(self.parse_objective()?),
                _ => Item::Constraint(self.parse_constraint()?),
            };
            items.push(item);
            self.end_of_statement()?;
        }

        Ok(Program { items })
    }

    fn end_of_statement(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Comment | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of statement")),
        }
    }

    fn parse_variable(&mut self) -> Result<VariableDecl, ParseError> {
        let start = self.expect(TokenKind::Var)?.span;
        let name = self.expect(TokenKind::Ident)?.text;

        let description = if self.peek_kind() == TokenKind::String {
            Some(self.parse_string()?)
        } else {
            None
        };

        Ok(VariableDecl {
            span: Span::new(start.start, self.previous_end(start.end)),
            name,
            description,
        })
    }

    fn parse_objective(&mut self) -> Result<ObjectiveDecl, ParseError> {
        let keyword = self.advance().cloned().ok_or(ParseError::UnexpectedEof)?;
        let sense = match keyword.kind {
            TokenKind::Max => SenseKeyword::Max,
            _ => SenseKeyword::Min,
        };
        let expr = self.parse_expr()?;

        Ok(ObjectiveDecl {
            span: keyword.span.merge(expr.span),
            sense,
            expr,
        })
    }

    fn parse_constraint(&mut self) -> Result<ConstraintDecl, ParseError> {
        let start = self.current().map(|t| t.span.start).unwrap_or(0);

        // Optional `label "description":` prefix
        let mut label = None;
        let mut description = None;
        if self.peek_kind() == TokenKind::Ident
            && matches!(self.peek_kind_at(1), TokenKind::Colon | TokenKind::String)
        {
            label = self.advance().map(|t| t.text.clone());
            if self.peek_kind() == TokenKind::String {
                description = Some(self.parse_string()?);
            }
            self.expect(TokenKind::Colon)?;
        }

        let expr = self.parse_expr()?;

        let relation = match self.peek_kind() {
            TokenKind::Le => RelationKeyword::Le,
            TokenKind::Ge => RelationKeyword::Ge,
            TokenKind::Eq => RelationKeyword::Eq,
            _ => return Err(self.unexpected("<=, >= or =")),
        };
        self.advance();

        let rhs = self.parse_signed_number()?;

        Ok(ConstraintDecl {
            span: Span::new(start, self.previous_end(start)),
            label,
            description,
            expr,
            relation,
            rhs,
        })
    }

    /// Linear expression; stops at the first token that cannot continue it
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().map(|t| t.span.start).unwrap_or(0);
        let mut terms = Vec::new();

        let mut sign = match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            _ => 1.0,
        };

        loop {
            let mut term = self.parse_term()?;
            term.coefficient *= sign;
            terms.push(term);

            sign = match self.peek_kind() {
                TokenKind::Plus => 1.0,
                TokenKind::Minus => -1.0,
                _ => break,
            };
            self.advance();
        }

        Ok(Expr {
            span: Span::new(start, self.previous_end(start)),
            terms,
        })
    }

    /// `[number ['*']] variable`
    fn parse_term(&mut self) -> Result<Term, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));

        let coefficient = if self.peek_kind() == TokenKind::Number {
            let value = self.parse_number()?;
            match self.peek_kind() {
                TokenKind::Star => {
                    self.advance();
                }
                TokenKind::Ident => {}
                _ => return Err(ParseError::ConstantTerm(Span::new(start.start, self.previous_end(start.end)))),
            }
            value
        } else {
            1.0
        };

        let variable = match self.current().cloned() {
            Some(t) if t.kind == TokenKind::Ident => {
                self.advance();
                t.text
            }
            _ => return Err(self.unexpected("variable")),
        };

        Ok(Term {
            span: Span::new(start.start, self.previous_end(start.end)),
            coefficient,
            variable,
        })
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let token = self.expect(TokenKind::Number)?;
        token
            .text
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber(token.text.clone()))
    }

    fn parse_signed_number(&mut self) -> Result<f64, ParseError> {
        let sign = match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            _ => 1.0,
        };
        Ok(sign * self.parse_number()?)
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let token = self.expect(TokenKind::String)?;
        let text = token.text.as_str();
        if text.len() < 2 || !text.ends_with('"') {
            return Err(ParseError::UnterminatedString(token.span));
        }
        Ok(text[1..text.len() - 1].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_model() {
        let source = r#"
            // Trousers and shirts
            var x0 "Trousers (units/day)"
            var x1 "Shirts (units/day)"

            max 3 x0 + 2 x1
            cloth "Metres of cloth": 2 x0 + x1 <= 10
            x0 - x1 >= -4
        "#;
        let program = Parser::parse(source).unwrap();
        assert_eq!(program.items.len(), 5);

        match &program.items[0] {
            Item::Variable(v) => {
                assert_eq!(v.name, "x0");
                assert_eq!(v.description.as_deref(), Some("Trousers (units/day)"));
            }
            _ => panic!("Expected variable"),
        }
        match &program.items[2] {
            Item::Objective(o) => {
                assert_eq!(o.sense, SenseKeyword::Max);
                assert_eq!(o.expr.terms.len(), 2);
                assert_eq!(o.expr.terms[0].coefficient, 3.0);
                assert_eq!(o.expr.terms[1].variable, "x1");
            }
            _ => panic!("Expected objective"),
        }
        match &program.items[3] {
            Item::Constraint(c) => {
                assert_eq!(c.label.as_deref(), Some("cloth"));
                assert_eq!(c.description.as_deref(), Some("Metres of cloth"));
                assert_eq!(c.relation, RelationKeyword::Le);
                assert_eq!(c.rhs, 10.0);
            }
            _ => panic!("Expected constraint"),
        }
        match &program.items[4] {
            Item::Constraint(c) => {
                assert!(c.label.is_none());
                assert_eq!(c.expr.terms[1].coefficient, -1.0);
                assert_eq!(c.relation, RelationKeyword::Ge);
                assert_eq!(c.rhs, -4.0);
            }
            _ => panic!("Expected constraint"),
        }
    }

    #[test]
    fn test_semicolons_and_star() {
        let program = Parser::parse("min 1.5*x0 + x1; x0 + x1 = 3; -x0 <= 0").unwrap();
        assert_eq!(program.items.len(), 3);
        match &program.items[2] {
            Item::Constraint(c) => {
                assert_eq!(c.expr.terms[0].coefficient, -1.0);
                assert_eq!(c.relation, RelationKeyword::Le);
            }
            _ => panic!("Expected constraint"),
        }
    }

    #[test]
    fn test_label_without_description() {
        let program = Parser::parse("limit: x0 <= 4").unwrap();
        match &program.items[0] {
            Item::Constraint(c) => {
                assert_eq!(c.label.as_deref(), Some("limit"));
                assert!(c.description.is_none());
            }
            _ => panic!("Expected constraint"),
        }
    }

    #[test]
    fn test_constant_on_left_is_rejected() {
        let err = Parser::parse("x0 + 4 <= 10").unwrap_err();
        assert!(matches!(err, ParseError::ConstantTerm(_)));
        assert_eq!(err.span(), Some(Span::new(5, 6)));
    }

    #[test]
    fn test_missing_relation() {
        let err = Parser::parse("x0 + x1 10").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_continuation_line_starts_new_statement() {
        let program = Parser::parse("max x0\n+ x1 <= 3").unwrap();
        assert_eq!(program.items.len(), 2);
        match &program.items[0] {
            Item::Objective(o) => assert_eq!(o.expr.terms.len(), 1),
            _ => panic!("Expected objective"),
        }
    }

    #[test]
    fn test_unterminated_string() {
        let err = Parser::parse("var x0 \"oops\nmax x0").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString(_)));
    }

    #[test]
    fn test_missing_rhs() {
        assert_eq!(Parser::parse("x0 <=").unwrap_err(), ParseError::UnexpectedEof);
    }
}
