//! Expression node
//!
//! Entries are evaluated in order against the node input. The output built
//! so far is bound to `$`, so `$.subtotal` reads an earlier entry.

use super::NodeOutput;
use crate::engine::{Interpreter, Scope};
use crate::error::Result;
use verdict_core::ir::CompiledExpressionEntry;
use verdict_core::types::Map;
use verdict_core::Value;

pub(crate) fn evaluate(
    interpreter: &Interpreter,
    expressions: &[CompiledExpressionEntry],
    input: &Value,
    nodes: Option<&Value>,
) -> Result<NodeOutput> {
    let mut output = Value::object();
    let mut results = Map::new();

    for entry in expressions {
        let scope = Scope::new(input).with_subject(&output).with_nodes(nodes);
        let value = interpreter.evaluate(&entry.value.expression, scope)?;
        tracing::debug!(key = %entry.key, "evaluated expression entry");

        let mut detail = Map::new();
        detail.insert("expression".to_string(), Value::from(entry.value.source.as_str()));
        detail.insert("result".to_string(), value.clone());
        results.insert(entry.key.clone(), Value::Object(detail));

        output.dot_insert(&entry.key, value);
    }

    Ok(NodeOutput::new(output, Value::Object(results)))
}
