//! Unary expression parser
//!
//! Unary expressions are rule conditions written against an implicit subject
//! `$`. The parser rewrites them into ordinary expressions:
//!
//! | source              | parsed as                          |
//! |---------------------|------------------------------------|
//! | `'FR', 'ES'`        | `$ == 'FR' or $ == 'ES'`           |
//! | `> 10`              | `$ > 10`                           |
//! | `[10..20]`          | `$ in [10..20]`                    |
//! | `not in ['a']`      | `$ not in ['a']`                   |
//! | `$ > 1 and $ < 5`   | unchanged                          |
//! | `startsWith($, 'x')`| unchanged                          |
//!
//! Pairs are joined by `,`, `or` or `and`, left to right with no precedence
//! between joiners. An empty source is a wildcard and parses to `None`.

use crate::error::Result;
use crate::expression_parser::{Parser, BP_AND, BP_COMPARISON};
use crate::lexer::TokenKind;
use verdict_core::ast::{Expression, Operator};

/// Name of the implicit subject
pub const SUBJECT: &str = "$";

/// Unary expression parser
pub struct UnaryParser;

impl UnaryParser {
    /// Parse a unary expression; `Ok(None)` means the wildcard.
    pub fn parse(source: &str) -> Result<Option<Expression>> {
        if source.trim().is_empty() {
            return Ok(None);
        }

        let mut parser = Parser::new(source)?;
        let mut left = pair(&mut parser)?;

        while !parser.is_done() {
            let op = match parser.current_kind() {
                Some(TokenKind::Comma | TokenKind::Or | TokenKind::PipePipe) => Operator::Or,
                Some(TokenKind::And | TokenKind::AmpAmp) => Operator::And,
                _ => return Err(parser.unexpected("',', 'and' or 'or'")),
            };
            parser.advance();

            let right = pair(&mut parser)?;
            left = Expression::binary(left, op, right);
        }

        Ok(Some(left))
    }
}

fn leading_comparison(parser: &Parser) -> Option<(Operator, usize)> {
    let op = match parser.current_kind()? {
        TokenKind::EqEq => (Operator::Eq, 1),
        TokenKind::NotEq => (Operator::Ne, 1),
        TokenKind::Lt => (Operator::Lt, 1),
        TokenKind::Le => (Operator::Le, 1),
        TokenKind::Gt => (Operator::Gt, 1),
        TokenKind::Ge => (Operator::Ge, 1),
        TokenKind::In => (Operator::In, 1),
        TokenKind::Not if parser.peek_kind(1) == Some(&TokenKind::In) => (Operator::NotIn, 2),
        _ => return None,
    };
    Some(op)
}

fn pair(parser: &mut Parser) -> Result<Expression> {
    let position = parser.current().map(|t| t.position).unwrap_or_default();
    let subject = Expression::identifier(SUBJECT, position);

    if let Some((op, width)) = leading_comparison(parser) {
        for _ in 0..width {
            parser.advance();
        }
        let operand = parser.binary(BP_COMPARISON)?;
        return Ok(Expression::binary(subject, op, operand));
    }

    let expression = parser.binary(BP_AND)?;
    let rewritten = match expression {
        Expression::Array { .. } | Expression::Interval { .. } => {
            Expression::binary(subject, Operator::In, expression)
        }
        expression if expression.is_boolean_shaped() => expression,
        expression => Expression::binary(subject, Operator::Eq, expression),
    };

    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use verdict_core::Value;

    fn subject(position: usize) -> Expression {
        Expression::identifier(SUBJECT, position)
    }

    fn literal(value: impl Into<Value>, position: usize) -> Expression {
        Expression::literal(value.into(), position)
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(UnaryParser::parse("").unwrap(), None);
        assert_eq!(UnaryParser::parse("   \t").unwrap(), None);
    }

    #[test]
    fn test_literal_equality() {
        assert_eq!(
            UnaryParser::parse("'str'").unwrap(),
            Some(Expression::binary(subject(0), Operator::Eq, literal("str", 0)))
        );
        assert_eq!(
            UnaryParser::parse("20.5").unwrap(),
            Some(Expression::binary(subject(0), Operator::Eq, literal(20.5, 0)))
        );
    }

    #[test]
    fn test_comma_list_is_or() {
        let parsed = UnaryParser::parse("'a', 'b'").unwrap();
        assert_eq!(
            parsed,
            Some(Expression::binary(
                Expression::binary(subject(0), Operator::Eq, literal("a", 0)),
                Operator::Or,
                Expression::binary(subject(5), Operator::Eq, literal("b", 5)),
            ))
        );
    }

    #[test]
    fn test_leading_comparison() {
        assert_eq!(
            UnaryParser::parse("< 50").unwrap(),
            Some(Expression::binary(subject(0), Operator::Lt, literal(50, 2)))
        );
        assert!(matches!(
            UnaryParser::parse("not in [1..10]").unwrap(),
            Some(Expression::Binary { op: Operator::NotIn, .. })
        ));
    }

    #[test]
    fn test_ranges_and_arrays_use_membership() {
        for source in ["[1..10]", "in [1..10]", "[1, 2, 3]", "(0..1]"] {
            assert!(
                matches!(
                    UnaryParser::parse(source).unwrap(),
                    Some(Expression::Binary { op: Operator::In, .. })
                ),
                "{} should be a membership test",
                source
            );
        }
    }

    #[test]
    fn test_boolean_expressions_are_kept() {
        let parsed = UnaryParser::parse("$ > 1 and $ < 5").unwrap().unwrap();
        let Expression::Binary { op, left, right, .. } = parsed else {
            panic!("expected binary");
        };
        assert_eq!(op, Operator::And);
        assert!(matches!(*left, Expression::Binary { op: Operator::Gt, .. }));
        assert!(matches!(*right, Expression::Binary { op: Operator::Lt, .. }));

        assert!(matches!(
            UnaryParser::parse("startsWith($, 'x')").unwrap(),
            Some(Expression::FunctionCall { .. })
        ));
    }

    #[test]
    fn test_mixed_joiners() {
        let parsed = UnaryParser::parse("> 10 and < 20, 50").unwrap().unwrap();
        let Expression::Binary { op, left, .. } = parsed else {
            panic!("expected binary");
        };
        assert_eq!(op, Operator::Or);
        assert!(matches!(*left, Expression::Binary { op: Operator::And, .. }));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            UnaryParser::parse("'a' 'b'").unwrap_err(),
            ParseError::UnexpectedToken { position: 4, .. }
        ));
        assert!(UnaryParser::parse(">").is_err());
        assert!(UnaryParser::parse("[1..").is_err());
    }
}
