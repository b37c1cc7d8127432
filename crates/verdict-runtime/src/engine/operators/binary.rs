//! Arithmetic and membership operator execution

use crate::config::ZeroDivisionPolicy;
use crate::error::{Result, RuntimeError};
use verdict_core::ast::Operator;
use verdict_core::Value;

/// Execute an arithmetic operation
pub(crate) fn execute_arithmetic(
    left: &Value,
    op: Operator,
    right: &Value,
    policy: ZeroDivisionPolicy,
    position: usize,
) -> Result<Value> {
    // Null in arithmetic propagates so missing fields do not abort evaluation
    if left.is_null() || right.is_null() {
        tracing::debug!("Null in arithmetic: {} {} {}, returning null", left, op, right);
        return Ok(Value::Null);
    }

    let result = match (left, op, right) {
        (Value::String(l), Operator::Add, Value::String(r)) => {
            return Ok(Value::String(format!("{}{}", l, r)))
        }
        (Value::Number(l), Operator::Add, Value::Number(r)) => l + r,
        (Value::Number(l), Operator::Sub, Value::Number(r)) => l - r,
        (Value::Number(l), Operator::Mul, Value::Number(r)) => l * r,
        (Value::Number(l), Operator::Pow, Value::Number(r)) => l.powf(*r),
        (Value::Number(l), Operator::Div | Operator::Mod, Value::Number(r)) => {
            if *r == 0.0 {
                return match policy {
                    ZeroDivisionPolicy::Error => {
                        Err(RuntimeError::expression(position, "Division by zero"))
                    }
                    ZeroDivisionPolicy::Null => Ok(Value::Null),
                };
            }
            if op == Operator::Div {
                l / r
            } else {
                l % r
            }
        }
        _ => {
            return Err(RuntimeError::expression(
                position,
                format!(
                    "Cannot apply '{}' to {} and {}",
                    op,
                    left.type_name(),
                    right.type_name()
                ),
            ))
        }
    };

    if !result.is_finite() {
        return Err(RuntimeError::expression(
            position,
            format!("Arithmetic overflow: {} {} {}", left, op, right),
        ));
    }
    Ok(Value::Number(result))
}

/// Membership test for `in` / `not in` against arrays, strings and objects
pub(crate) fn execute_membership(needle: &Value, haystack: &Value, position: usize) -> Result<bool> {
    match haystack {
        Value::Null => Ok(false),
        Value::Array(items) => Ok(items.iter().any(|item| item == needle)),
        Value::String(text) => match needle {
            Value::String(part) => Ok(text.contains(part.as_str())),
            Value::Null => Ok(false),
            other => Err(RuntimeError::expression(
                position,
                format!("Cannot test {} membership in a string", other.type_name()),
            )),
        },
        Value::Object(map) => match needle {
            Value::String(key) => Ok(map.contains_key(key)),
            _ => Ok(false),
        },
        other => Err(RuntimeError::expression(
            position,
            format!("Cannot test membership in {}", other.type_name()),
        )),
    }
}
