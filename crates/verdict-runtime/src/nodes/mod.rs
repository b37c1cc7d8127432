//! Node evaluators
//!
//! Synchronous node kinds (expression, decision table, switch) and the
//! transform attributes shared by every reshaping node. Nodes that reach
//! the host live in the executor.

pub(crate) mod expression;
pub(crate) mod switch;
pub(crate) mod table;
pub(crate) mod transform;

use verdict_core::Value;

/// Output of a node body together with its trace detail
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeOutput {
    pub output: Value,
    pub trace_data: Value,
}

impl NodeOutput {
    pub fn new(output: Value, trace_data: Value) -> Self {
        Self { output, trace_data }
    }
}
