//! Expression compiler
//!
//! Parses the expression strings embedded in node content into
//! `SourceExpression`s, attributing parse failures to the owning node.

use crate::error::{CompileError, Result};
use verdict_core::ir::SourceExpression;
use verdict_core::types::Schema;
use verdict_parser::{ExpressionParser, UnaryParser};

/// Expression compiler
pub struct ExpressionCompiler;

impl ExpressionCompiler {
    /// Compile a required standard expression
    pub fn standard(node_id: &str, source: &str) -> Result<SourceExpression> {
        let trimmed = source.trim();
        ExpressionParser::parse(trimmed)
            .map(|expression| SourceExpression::new(trimmed, expression))
            .map_err(|e| invalid(node_id, source, e))
    }

    /// Compile a standard expression where an empty source means "none"
    pub fn optional(node_id: &str, source: &str) -> Result<Option<SourceExpression>> {
        if source.trim().is_empty() {
            return Ok(None);
        }
        Self::standard(node_id, source).map(Some)
    }

    /// Compile a unary expression; empty sources are wildcards (`None`)
    pub fn unary(node_id: &str, source: &str) -> Result<Option<SourceExpression>> {
        let trimmed = source.trim();
        UnaryParser::parse(trimmed)
            .map(|parsed| parsed.map(|expression| SourceExpression::new(trimmed, expression)))
            .map_err(|e| invalid(node_id, source, e))
    }

    /// Compile a JSON Schema given inline or as a JSON string
    pub fn schema(node_id: &str, schema: Option<&serde_json::Value>) -> Result<Option<Schema>> {
        let parsed = match schema {
            None | Some(serde_json::Value::Null) => return Ok(None),
            Some(serde_json::Value::String(text)) if text.trim().is_empty() => return Ok(None),
            Some(serde_json::Value::String(text)) => serde_json::from_str(text).map_err(|e| {
                CompileError::graph("E012", Some(node_id), format!("Schema is not valid JSON: {}", e))
            })?,
            Some(inline) => inline.clone(),
        };

        Schema::from_json_schema(&parsed)
            .map(Some)
            .map_err(|e| CompileError::graph("E012", Some(node_id), format!("Invalid schema: {}", e)))
    }
}

fn invalid(node_id: &str, source: &str, error: verdict_parser::ParseError) -> CompileError {
    CompileError::InvalidExpression {
        node_id: node_id.to_string(),
        expression: source.to_string(),
        source: error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_core::ast::{Expression, Operator};

    #[test]
    fn test_standard_keeps_trimmed_source() {
        let compiled = ExpressionCompiler::standard("n1", "  a + 1 ").unwrap();
        assert_eq!(compiled.source, "a + 1");
        assert!(matches!(
            compiled.expression,
            Expression::Binary { op: Operator::Add, .. }
        ));
    }

    #[test]
    fn test_optional_and_unary_empty_sources() {
        assert_eq!(ExpressionCompiler::optional("n1", " ").unwrap(), None);
        assert_eq!(ExpressionCompiler::unary("n1", "").unwrap(), None);
        assert!(ExpressionCompiler::unary("n1", "> 5").unwrap().is_some());
    }

    #[test]
    fn test_parse_failure_names_node() {
        let err = ExpressionCompiler::standard("pricing", "a +").unwrap_err();
        assert_eq!(err.node_id(), Some("pricing"));
        assert_eq!(err.code(), Some("E010"));
        assert!(err.to_string().contains("'a +'"));
    }

    #[test]
    fn test_schema_forms() {
        assert_eq!(ExpressionCompiler::schema("in", None).unwrap(), None);
        assert_eq!(ExpressionCompiler::schema("in", Some(&json!(""))).unwrap(), None);

        let inline = json!({"type": "object", "properties": {"a": {"type": "number"}}});
        let from_object = ExpressionCompiler::schema("in", Some(&inline)).unwrap().unwrap();
        let from_string = ExpressionCompiler::schema("in", Some(&json!(inline.to_string())))
            .unwrap()
            .unwrap();
        assert_eq!(from_object, from_string);
        assert!(from_object.get_field("a").is_some());

        let err = ExpressionCompiler::schema("in", Some(&json!("{broken"))).unwrap_err();
        assert_eq!(err.code(), Some("E012"));
    }
}
