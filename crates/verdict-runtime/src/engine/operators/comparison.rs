//! Comparison operator execution

use crate::error::{Result, RuntimeError};
use std::cmp::Ordering;
use verdict_core::ast::Operator;
use verdict_core::Value;

/// Execute a comparison operation
pub(crate) fn execute_compare(left: &Value, op: Operator, right: &Value, position: usize) -> Result<bool> {
    match op {
        Operator::Eq => return Ok(left == right),
        Operator::Ne => return Ok(left != right),
        _ => {}
    }

    // Ordering against null is false so rules tolerate missing fields
    if left.is_null() || right.is_null() {
        tracing::debug!("Null comparison: {} {} {}, returning false", left, op, right);
        return Ok(false);
    }

    let ordering = match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => {
            return Err(RuntimeError::expression(
                position,
                format!(
                    "Cannot compare {} and {} with '{}'",
                    left.type_name(),
                    right.type_name(),
                    op
                ),
            ))
        }
    };

    let Some(ordering) = ordering else {
        return Ok(false);
    };

    Ok(match op {
        Operator::Lt => ordering == Ordering::Less,
        Operator::Le => ordering != Ordering::Greater,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::Ge => ordering != Ordering::Less,
        other => {
            return Err(RuntimeError::expression(
                position,
                format!("'{}' is not a comparison operator", other),
            ))
        }
    })
}
