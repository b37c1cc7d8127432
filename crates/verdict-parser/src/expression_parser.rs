//! Expression parser
//!
//! Parses expression source into `Expression` AST nodes with a Pratt parser.
//!
//! Supported syntax:
//! - Identifiers and member access: `customer.age`, `$.total`, `items[0]`
//! - Literals: `42`, `3.5`, `'string'`, `"string"`, `true`, `false`, `null`
//! - Arrays `[1, 2]`, objects `{a: 1}`, intervals `[1..10]`, `(0..1]`
//! - Binary operators: `+ - * / % ^`, `== != < <= > >=`, `and or && ||`,
//!   `in`, `not in`, `??`
//! - Unary operators: `not`, `!`, `-`, `+`
//! - Function calls with closures: `filter(items, # > 10)`
//! - Ternary: `a > 1 ? 'big' : 'small'`

use crate::error::{ParseError, Result};
use crate::lexer::{Lexer, Token, TokenKind};
use verdict_core::ast::{Expression, Operator, UnaryOperator};
use verdict_core::Value;

const BP_OR: u8 = 10;
/// Binding power of `and` / `&&`
pub(crate) const BP_AND: u8 = 15;
/// Binding power of comparisons and membership
pub(crate) const BP_COMPARISON: u8 = 20;
const BP_ADDITIVE: u8 = 30;
const BP_NOT: u8 = 50;
const BP_MULTIPLICATIVE: u8 = 60;
const BP_POWER: u8 = 100;
const BP_COALESCE: u8 = 110;
const BP_PREFIX: u8 = 120;

/// Expression parser
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parse a standard expression. The whole source must be consumed.
    pub fn parse(source: &str) -> Result<Expression> {
        let mut parser = Parser::new(source)?;
        if parser.is_done() {
            return Err(ParseError::EmptyExpression);
        }
        let expression = parser.expression()?;
        parser.expect_end()?;
        Ok(expression)
    }
}

/// Token cursor shared by the standard and unary parsers
pub(crate) struct Parser {
    tokens: Vec<Token>,
    index: usize,
    source_len: usize,
}

impl Parser {
    pub(crate) fn new(source: &str) -> Result<Self> {
        Ok(Self {
            tokens: Lexer::tokenize(source)?,
            index: 0,
            source_len: source.len(),
        })
    }

    pub(crate) fn is_done(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub(crate) fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub(crate) fn current_kind(&self) -> Option<&TokenKind> {
        self.current().map(|t| &t.kind)
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.index + offset).map(|t| &t.kind)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn end_position(&self) -> usize {
        self.source_len
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(token) => ParseError::UnexpectedToken {
                found: token.kind.to_string(),
                expected: expected.to_string(),
                position: token.position,
            },
            None => ParseError::UnexpectedEnd {
                expected: expected.to_string(),
                position: self.end_position(),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if self.current_kind() == Some(&kind) {
            self.advance().ok_or_else(|| self.unexpected(expected))
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn expect_end(&self) -> Result<()> {
        if self.is_done() {
            Ok(())
        } else {
            Err(self.unexpected("end of expression"))
        }
    }

    /// Full expression including the ternary conditional
    pub(crate) fn expression(&mut self) -> Result<Expression> {
        let condition = self.binary(0)?;

        if self.current_kind() != Some(&TokenKind::Question) {
            return Ok(condition);
        }
        self.advance();

        let true_expr = self.expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let false_expr = self.expression()?;
        let position = condition.position();

        Ok(Expression::Ternary {
            condition: Box::new(condition),
            true_expr: Box::new(true_expr),
            false_expr: Box::new(false_expr),
            position,
        })
    }

    /// Infix operator at the cursor, with its binding power and token width
    fn infix_operator(&self) -> Option<(Operator, u8, usize)> {
        let op = match self.current_kind()? {
            TokenKind::Or | TokenKind::PipePipe => (Operator::Or, BP_OR, 1),
            TokenKind::And | TokenKind::AmpAmp => (Operator::And, BP_AND, 1),
            TokenKind::EqEq => (Operator::Eq, BP_COMPARISON, 1),
            TokenKind::NotEq => (Operator::Ne, BP_COMPARISON, 1),
            TokenKind::Lt => (Operator::Lt, BP_COMPARISON, 1),
            TokenKind::Le => (Operator::Le, BP_COMPARISON, 1),
            TokenKind::Gt => (Operator::Gt, BP_COMPARISON, 1),
            TokenKind::Ge => (Operator::Ge, BP_COMPARISON, 1),
            TokenKind::In => (Operator::In, BP_COMPARISON, 1),
            TokenKind::Not if self.peek_kind(1) == Some(&TokenKind::In) => {
                (Operator::NotIn, BP_COMPARISON, 2)
            }
            TokenKind::Plus => (Operator::Add, BP_ADDITIVE, 1),
            TokenKind::Minus => (Operator::Sub, BP_ADDITIVE, 1),
            TokenKind::Star => (Operator::Mul, BP_MULTIPLICATIVE, 1),
            TokenKind::Slash => (Operator::Div, BP_MULTIPLICATIVE, 1),
            TokenKind::Percent => (Operator::Mod, BP_MULTIPLICATIVE, 1),
            TokenKind::Caret => (Operator::Pow, BP_POWER, 1),
            TokenKind::QuestionQuestion => (Operator::Coalesce, BP_COALESCE, 1),
            _ => return None,
        };
        Some(op)
    }

    /// Binary expression containing only operators that bind tighter than
    /// `min_bp`
    pub(crate) fn binary(&mut self, min_bp: u8) -> Result<Expression> {
        let mut left = self.prefix()?;

        while let Some((op, bp, width)) = self.infix_operator() {
            if bp <= min_bp {
                break;
            }
            self.index += width;

            // `^` is right-associative
            let right_bp = if op == Operator::Pow { bp - 1 } else { bp };
            let right = self.binary(right_bp)?;
            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    fn prefix(&mut self) -> Result<Expression> {
        let Some(token) = self.current().cloned() else {
            return Err(self.unexpected("expression"));
        };

        let (op, bp) = match token.kind {
            TokenKind::Not | TokenKind::Bang => (UnaryOperator::Not, BP_NOT),
            TokenKind::Minus => (UnaryOperator::Negate, BP_PREFIX),
            TokenKind::Plus => (UnaryOperator::Plus, BP_PREFIX),
            _ => return self.postfix(),
        };
        self.advance();

        let operand = self.binary(bp)?;
        Ok(Expression::unary(op, operand, token.position))
    }

    fn postfix(&mut self) -> Result<Expression> {
        let mut expression = self.primary()?;

        loop {
            match self.current_kind() {
                Some(TokenKind::Dot) => {
                    let dot = self.advance().map(|t| t.position).unwrap_or_default();
                    let property = self.property_name()?;
                    expression = Expression::Member {
                        object: Box::new(expression),
                        property,
                        position: dot,
                    };
                }
                Some(TokenKind::LBracket) => {
                    let bracket = self.advance().map(|t| t.position).unwrap_or_default();
                    let index = self.expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expression = Expression::Index {
                        object: Box::new(expression),
                        index: Box::new(index),
                        position: bracket,
                    };
                }
                _ => break,
            }
        }

        Ok(expression)
    }

    fn property_name(&mut self) -> Result<String> {
        let name = match self.current_kind() {
            Some(TokenKind::Identifier(name)) => name.clone(),
            Some(
                kind @ (TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Not
                | TokenKind::In),
            ) => kind.to_string(),
            Some(TokenKind::Number(n)) if n.fract() == 0.0 => format!("{}", *n as i64),
            _ => return Err(self.unexpected("property name")),
        };
        self.advance();
        Ok(name)
    }

    fn primary(&mut self) -> Result<Expression> {
        let Some(token) = self.advance() else {
            return Err(self.unexpected("expression"));
        };
        let position = token.position;

        let expression = match token.kind {
            TokenKind::Number(n) => Expression::literal(Value::Number(n), position),
            TokenKind::String(s) => Expression::literal(Value::String(s), position),
            TokenKind::True => Expression::literal(Value::Bool(true), position),
            TokenKind::False => Expression::literal(Value::Bool(false), position),
            TokenKind::Null => Expression::literal(Value::Null, position),
            TokenKind::Hash => Expression::ClosureItem { position },
            TokenKind::Identifier(name) => {
                if self.current_kind() == Some(&TokenKind::LParen) {
                    self.advance();
                    let args = self.list(TokenKind::RParen, "')'")?;
                    Expression::function_call(name, args, position)
                } else {
                    Expression::identifier(name, position)
                }
            }
            TokenKind::LParen => {
                let inner = self.expression()?;
                if self.current_kind() == Some(&TokenKind::DotDot) {
                    self.interval(inner, false, position)?
                } else {
                    self.expect(TokenKind::RParen, "')'")?;
                    inner
                }
            }
            TokenKind::LBracket => {
                if self.current_kind() == Some(&TokenKind::RBracket) {
                    self.advance();
                    return Ok(Expression::Array {
                        items: Vec::new(),
                        position,
                    });
                }
                let first = self.expression()?;
                if self.current_kind() == Some(&TokenKind::DotDot) {
                    self.interval(first, true, position)?
                } else {
                    let mut items = vec![first];
                    if self.current_kind() == Some(&TokenKind::Comma) {
                        self.advance();
                        items.extend(self.list(TokenKind::RBracket, "']'")?);
                    } else {
                        self.expect(TokenKind::RBracket, "']'")?;
                    }
                    Expression::Array { items, position }
                }
            }
            TokenKind::LBrace => self.object(position)?,
            other => {
                return Err(ParseError::UnexpectedToken {
                    found: other.to_string(),
                    expected: "expression".to_string(),
                    position,
                })
            }
        };

        Ok(expression)
    }

    /// Comma separated expressions up to `close`; an empty list and a
    /// trailing comma are accepted
    fn list(&mut self, close: TokenKind, expected: &str) -> Result<Vec<Expression>> {
        let mut items = Vec::new();
        loop {
            if self.current_kind() == Some(&close) {
                self.advance();
                return Ok(items);
            }
            items.push(self.expression()?);
            match self.current_kind() {
                Some(TokenKind::Comma) => {
                    self.advance();
                }
                Some(kind) if *kind == close => {}
                _ => return Err(self.unexpected(expected)),
            }
        }
    }

    fn interval(&mut self, left: Expression, left_closed: bool, position: usize) -> Result<Expression> {
        self.advance();
        let right = self.expression()?;
        let right_closed = match self.current_kind() {
            Some(TokenKind::RBracket) => true,
            Some(TokenKind::RParen) => false,
            _ => return Err(self.unexpected("']' or ')'")),
        };
        self.advance();

        Ok(Expression::Interval {
            left: Box::new(left),
            right: Box::new(right),
            left_closed,
            right_closed,
            position,
        })
    }

    fn object(&mut self, position: usize) -> Result<Expression> {
        let mut entries = Vec::new();
        loop {
            let key = match self.current_kind() {
                Some(TokenKind::RBrace) => {
                    self.advance();
                    break;
                }
                Some(TokenKind::String(key)) | Some(TokenKind::Identifier(key)) => key.clone(),
                Some(TokenKind::Number(n)) => Value::Number(*n).to_string(),
                _ => return Err(self.unexpected("object key")),
            };
            self.advance();

            self.expect(TokenKind::Colon, "':'")?;
            entries.push((key, self.expression()?));

            match self.current_kind() {
                Some(TokenKind::Comma) => {
                    self.advance();
                }
                Some(TokenKind::RBrace) => {}
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }

        Ok(Expression::Object { entries, position })
    }
}
