//! Expression evaluation outside a decision graph
//!
//! These use the default interpreter settings. Use the methods on
//! [`DecisionEngine`](crate::DecisionEngine) to apply an engine's
//! configuration instead.

use crate::error::Result;
use verdict_core::Value;

/// Evaluate a standard expression against `context`
///
/// ```
/// use serde_json::json;
/// use verdict_sdk::{evaluate_expression, Value};
///
/// let total = evaluate_expression("sum(a)", json!({"a": [1, 2, 3, 4]})).unwrap();
/// assert_eq!(total, Value::from(10));
/// ```
pub fn evaluate_expression(expression: &str, context: impl Into<Value>) -> Result<Value> {
    Ok(verdict_runtime::evaluate_expression(expression, &context.into())?)
}

/// Evaluate a unary expression against `$` in `context`. An empty
/// expression is always true.
pub fn evaluate_unary_expression(expression: &str, context: impl Into<Value>) -> Result<bool> {
    Ok(verdict_runtime::evaluate_unary_expression(
        expression,
        &context.into(),
    )?)
}

/// Render `{{ expression }}` placeholders. A template that is a single
/// placeholder yields the expression's own value.
pub fn render_template(template: &str, context: impl Into<Value>) -> Result<Value> {
    Ok(verdict_runtime::render_template(template, &context.into())?)
}
