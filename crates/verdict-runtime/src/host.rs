//! Host capability
//!
//! The executor reaches the outside world through `DecisionHost`: loading
//! nested decisions by key and dispatching custom nodes. Hosts decide
//! whether those calls block or suspend.

use crate::engine::{Interpreter, Scope};
use crate::error::{Result, RuntimeError};
use crate::template;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use verdict_core::{CompiledDecision, Value};
use verdict_parser::TemplateParser;

/// Capability the executor is written against
#[async_trait]
pub trait DecisionHost: Send + Sync {
    /// Resolve a nested decision by key
    async fn load(&self, key: &str) -> Result<Arc<CompiledDecision>>;

    /// Run a custom node and return its output
    async fn handle(&self, request: CustomNodeRequest) -> Result<Value>;
}

/// Request passed to a custom node handler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomNodeRequest {
    pub node_id: String,
    pub name: String,
    /// Handler-defined discriminator from the node's `kind`
    pub kind: String,
    pub config: Value,
    pub input: Value,
}

impl CustomNodeRequest {
    pub fn new(node_id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>, config: Value, input: Value) -> Self {
        Self {
            node_id: node_id.into(),
            name: name.into(),
            kind: kind.into(),
            config,
            input,
        }
    }

    /// Config value at a dot path. String values are rendered as templates
    /// against the node input, so `"{{ customer.id }}"` yields the id itself.
    pub fn get_field(&self, path: &str) -> Result<Value> {
        match self.config.dot(path) {
            None => Ok(Value::Null),
            Some(Value::String(source)) => {
                let template = TemplateParser::parse(source).map_err(|e| {
                    RuntimeError::expression(e.position().unwrap_or(0), e.to_string())
                })?;
                template::render(&template, &Interpreter::default(), Scope::new(&self.input))
            }
            Some(other) => Ok(other.clone()),
        }
    }

    /// Raw config value at a dot path, without template rendering
    pub fn get_raw_field(&self, path: &str) -> Option<&Value> {
        self.config.dot(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> CustomNodeRequest {
        CustomNodeRequest::new(
            "fx",
            "Rates",
            "fx-rate",
            Value::from(json!({
                "currency": "{{ order.currency }}",
                "label": "rate for {{ order.currency }}",
                "retries": 3,
                "nested": {"path": "{{ order.amount * 2 }}"}
            })),
            Value::from(json!({"order": {"currency": "EUR", "amount": 21}})),
        )
    }

    #[test]
    fn test_get_field_renders_templates() {
        let request = request();
        assert_eq!(request.get_field("currency").unwrap(), Value::from("EUR"));
        assert_eq!(request.get_field("label").unwrap(), Value::from("rate for EUR"));
        assert_eq!(request.get_field("nested.path").unwrap(), Value::from(42));
        assert_eq!(request.get_field("retries").unwrap(), Value::from(3));
        assert_eq!(request.get_field("absent").unwrap(), Value::Null);
    }

    #[test]
    fn test_get_raw_field() {
        let request = request();
        assert_eq!(
            request.get_raw_field("currency"),
            Some(&Value::from("{{ order.currency }}"))
        );
    }

    #[test]
    fn test_bad_template_is_expression_error() {
        let mut request = request();
        request.config = Value::from(json!({"broken": "{{ order"}));
        assert!(matches!(
            request.get_field("broken").unwrap_err(),
            RuntimeError::Expression { position: 0, .. }
        ));
    }
}
