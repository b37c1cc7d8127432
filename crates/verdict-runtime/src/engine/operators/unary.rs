//! Unary operator execution

use crate::error::{Result, RuntimeError};
use verdict_core::ast::UnaryOperator;
use verdict_core::Value;

/// Execute a unary operation
pub(crate) fn execute_unary_op(operand: &Value, op: UnaryOperator, position: usize) -> Result<Value> {
    match (op, operand) {
        (UnaryOperator::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOperator::Not, Value::Null) => Ok(Value::Bool(true)),
        (UnaryOperator::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOperator::Plus, Value::Number(n)) => Ok(Value::Number(*n)),
        (UnaryOperator::Negate | UnaryOperator::Plus, Value::Null) => Ok(Value::Null),
        _ => Err(RuntimeError::expression(
            position,
            format!("Cannot apply {:?} to {}", op, operand.type_name()),
        )),
    }
}
