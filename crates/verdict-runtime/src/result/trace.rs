//! Node trace
//!
//! One entry per executed node, recorded only when tracing is enabled.
//! Skipped nodes produce no entry.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use verdict_core::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTrace {
    pub id: String,
    pub name: String,
    /// Wire name of the node kind
    #[serde(rename = "type")]
    pub kind: String,
    pub input: Value,
    pub output: Value,
    /// Elapsed time, human readable
    pub performance: String,
    /// Kind-specific detail: matched rules, selected statements,
    /// per-expression results or a swallowed error
    #[serde(skip_serializing_if = "Value::is_null", default)]
    pub trace_data: Value,
}

impl NodeTrace {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            input: Value::Null,
            output: Value::Null,
            performance: String::new(),
            trace_data: Value::Null,
        }
    }

    pub fn with_io(mut self, input: Value, output: Value) -> Self {
        self.input = input;
        self.output = output;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.performance = format!("{:.1?}", elapsed);
        self
    }

    pub fn with_trace_data(mut self, data: Value) -> Self {
        self.trace_data = data;
        self
    }
}
