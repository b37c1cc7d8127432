//! Expression AST nodes
//!
//! Every node records the byte offset of the token it starts at so that
//! evaluation errors can point back into the source text.

use super::operator::Operator;
use crate::types::Value;
use serde::{Deserialize, Serialize};

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Literal value (number, string, bool, null)
    Literal { value: Value, position: usize },

    /// Root identifier resolved against the context (e.g. `customer`, `$`)
    Identifier { name: String, position: usize },

    /// Property access (`object.property`)
    Member {
        object: Box<Expression>,
        property: String,
        position: usize,
    },

    /// Computed access (`object[index]`)
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
        position: usize,
    },

    /// Binary operation
    Binary {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
        position: usize,
    },

    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
        position: usize,
    },

    /// Built-in function call
    FunctionCall {
        name: String,
        args: Vec<Expression>,
        position: usize,
    },

    /// Ternary conditional (condition ? true_expr : false_expr)
    Ternary {
        condition: Box<Expression>,
        true_expr: Box<Expression>,
        false_expr: Box<Expression>,
        position: usize,
    },

    /// Array literal
    Array {
        items: Vec<Expression>,
        position: usize,
    },

    /// Object literal, entries kept in source order
    Object {
        entries: Vec<(String, Expression)>,
        position: usize,
    },

    /// Interval literal such as `[1..10]` or `(0..1]`
    Interval {
        left: Box<Expression>,
        right: Box<Expression>,
        left_closed: bool,
        right_closed: bool,
        position: usize,
    },

    /// Current element inside a closure argument (`#`)
    ClosureItem { position: usize },
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Logical NOT (not, !)
    Not,
    /// Arithmetic negation (-)
    Negate,
    /// Numeric identity (+)
    Plus,
}

impl Expression {
    /// Byte offset of the expression in its source
    pub fn position(&self) -> usize {
        match self {
            Expression::Literal { position, .. }
            | Expression::Identifier { position, .. }
            | Expression::Member { position, .. }
            | Expression::Index { position, .. }
            | Expression::Binary { position, .. }
            | Expression::Unary { position, .. }
            | Expression::FunctionCall { position, .. }
            | Expression::Ternary { position, .. }
            | Expression::Array { position, .. }
            | Expression::Object { position, .. }
            | Expression::Interval { position, .. }
            | Expression::ClosureItem { position } => *position,
        }
    }

    /// Create a literal expression
    pub fn literal(value: Value, position: usize) -> Self {
        Expression::Literal { value, position }
    }

    /// Create an identifier expression
    pub fn identifier(name: impl Into<String>, position: usize) -> Self {
        Expression::Identifier {
            name: name.into(),
            position,
        }
    }

    /// Create a binary expression positioned at its left operand
    pub fn binary(left: Expression, op: Operator, right: Expression) -> Self {
        let position = left.position();
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
            position,
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOperator, operand: Expression, position: usize) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
            position,
        }
    }

    /// Create a function call expression
    pub fn function_call(name: impl Into<String>, args: Vec<Expression>, position: usize) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
            position,
        }
    }

    /// True if evaluating this expression can only produce a boolean
    /// (comparisons, logical operators, negation of either).
    pub fn is_boolean_shaped(&self) -> bool {
        match self {
            Expression::Binary { op, .. } => {
                op.is_comparison() || op.is_logical() || op.is_membership()
            }
            Expression::Unary {
                op: UnaryOperator::Not,
                ..
            } => true,
            Expression::FunctionCall { name, .. } => matches!(
                name.as_str(),
                "all"
                    | "some"
                    | "none"
                    | "one"
                    | "contains"
                    | "startsWith"
                    | "endsWith"
                    | "matches"
                    | "isNumeric"
                    | "bool"
            ),
            Expression::Ternary {
                true_expr,
                false_expr,
                ..
            } => true_expr.is_boolean_shaped() && false_expr.is_boolean_shaped(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_expression_takes_left_position() {
        // customer.age > 18
        let expr = Expression::binary(
            Expression::Member {
                object: Box::new(Expression::identifier("customer", 0)),
                property: "age".to_string(),
                position: 8,
            },
            Operator::Gt,
            Expression::literal(Value::Number(18.0), 15),
        );

        assert_eq!(expr.position(), 8);
        let Expression::Binary { op, right, .. } = &expr else {
            panic!("Expected Binary expression");
        };
        assert_eq!(*op, Operator::Gt);
        assert_eq!(**right, Expression::literal(Value::Number(18.0), 15));
    }

    #[test]
    fn test_boolean_shape() {
        let comparison = Expression::binary(
            Expression::identifier("a", 0),
            Operator::Lt,
            Expression::literal(Value::Number(1.0), 4),
        );
        assert!(comparison.is_boolean_shaped());

        let sum = Expression::binary(
            Expression::identifier("a", 0),
            Operator::Add,
            Expression::literal(Value::Number(1.0), 4),
        );
        assert!(!sum.is_boolean_shaped());
        assert!(Expression::unary(UnaryOperator::Not, sum.clone(), 0).is_boolean_shaped());
        assert!(!Expression::function_call("sum", vec![sum], 0).is_boolean_shaped());
    }
}
