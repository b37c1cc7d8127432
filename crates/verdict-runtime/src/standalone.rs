//! Expression, unary and template evaluation outside of a decision graph

use crate::engine::{Interpreter, Scope};
use crate::error::{Result, RuntimeError};
use crate::template;
use verdict_core::Value;
use verdict_parser::{ExpressionParser, ParseError, TemplateParser, UnaryParser, SUBJECT};

fn expression_error(error: ParseError) -> RuntimeError {
    RuntimeError::expression(error.position().unwrap_or(0), error.to_string())
}

/// Evaluate a standard expression against a context
pub fn evaluate_expression(source: &str, context: &Value) -> Result<Value> {
    evaluate_expression_with(&Interpreter::default(), source, context)
}

pub fn evaluate_expression_with(interpreter: &Interpreter, source: &str, context: &Value) -> Result<Value> {
    let expression = ExpressionParser::parse(source).map_err(expression_error)?;
    interpreter.evaluate(&expression, Scope::new(context))
}

/// Evaluate a unary expression against a context holding `$`.
/// Empty expressions match anything, with or without `$`.
pub fn evaluate_unary_expression(source: &str, context: &Value) -> Result<bool> {
    evaluate_unary_expression_with(&Interpreter::default(), source, context)
}

pub fn evaluate_unary_expression_with(interpreter: &Interpreter, source: &str, context: &Value) -> Result<bool> {
    let Some(expression) =
        UnaryParser::parse(source).map_err(|e| RuntimeError::UnaryExpression(e.to_string()))?
    else {
        return Ok(true);
    };

    let subject = context
        .as_object()
        .and_then(|map| map.get(SUBJECT))
        .ok_or(RuntimeError::MissingSubject)?;
    interpreter.evaluate_unary(&expression, Scope::new(context).with_subject(subject))
}

/// Render a `{{ expr }}` template against a context
pub fn render_template(source: &str, context: &Value) -> Result<Value> {
    render_template_with(&Interpreter::default(), source, context)
}

pub fn render_template_with(interpreter: &Interpreter, source: &str, context: &Value) -> Result<Value> {
    let parsed = TemplateParser::parse(source).map_err(expression_error)?;
    template::render(&parsed, interpreter, Scope::new(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: serde_json::Value) -> Value {
        Value::from(value)
    }

    #[test]
    fn test_evaluate_expression() {
        assert_eq!(evaluate_expression("sum(a)", &ctx(json!({"a": [1, 2, 3, 4]}))).unwrap(), Value::from(10));
        assert!(matches!(
            evaluate_expression("1 +", &ctx(json!({}))).unwrap_err(),
            RuntimeError::Expression { .. }
        ));
    }

    #[test]
    fn test_unary_wildcard_needs_no_subject() {
        assert!(evaluate_unary_expression("", &ctx(json!({}))).unwrap());
        assert!(evaluate_unary_expression("   ", &ctx(json!({"$": 1}))).unwrap());
    }

    #[test]
    fn test_unary_lists() {
        assert!(evaluate_unary_expression("'FR','ES','GB'", &ctx(json!({"$": "GB"}))).unwrap());
        assert!(!evaluate_unary_expression("'FR','ES','GB'", &ctx(json!({"$": "DE"}))).unwrap());
    }

    #[test]
    fn test_unary_errors() {
        assert_eq!(
            evaluate_unary_expression("> 10", &ctx(json!({"a": 1}))).unwrap_err(),
            RuntimeError::MissingSubject
        );
        assert!(matches!(
            evaluate_unary_expression("> ", &ctx(json!({"$": 1}))).unwrap_err(),
            RuntimeError::UnaryExpression(_)
        ));
    }

    #[test]
    fn test_render_template() {
        assert_eq!(render_template("{{ a + b }}", &ctx(json!({"a": 10, "b": 20}))).unwrap(), Value::from(30));
        assert!(matches!(
            render_template("{{ a", &ctx(json!({"a": 1}))).unwrap_err(),
            RuntimeError::Expression { position: 0, .. }
        ));
    }
}
