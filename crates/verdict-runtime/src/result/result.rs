//! Evaluation result

use super::trace::NodeTrace;
use serde::{Deserialize, Serialize};
use verdict_core::Value;

/// Result of evaluating a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResponse {
    /// Output of the output node, `{}` when it was skipped
    pub result: Value,

    /// Per-node trace in execution order, when tracing was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<NodeTrace>>,

    /// Wall time of the whole evaluation
    pub performance: String,
}

impl DecisionResponse {
    pub fn new(result: Value) -> Self {
        Self {
            result,
            trace: None,
            performance: String::new(),
        }
    }

    /// Trace entry of a node by id
    pub fn node_trace(&self, id: &str) -> Option<&NodeTrace> {
        self.trace.as_ref()?.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization_omits_absent_trace() {
        let mut response = DecisionResponse::new(Value::from(json!({"output": 10})));
        response.performance = "1.2ms".to_string();

        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded, json!({"result": {"output": 10}, "performance": "1.2ms"}));
    }
}
