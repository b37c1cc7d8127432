//! Transform attributes
//!
//! `inputField` picks the node input, `outputPath` nests the output and
//! `passThrough` merges the original input back in. Loop execution is
//! driven by the executor using `loop_items`.

use crate::engine::{Interpreter, Scope};
use crate::error::{Result, RuntimeError};
use verdict_core::ir::CompiledTransform;
use verdict_core::Value;

/// Input the node body sees
pub(crate) fn select_input(
    interpreter: &Interpreter,
    transform: &CompiledTransform,
    input: &Value,
    nodes: Option<&Value>,
) -> Result<Value> {
    match &transform.input_field {
        Some(field) => interpreter.evaluate(&field.expression, Scope::new(input).with_nodes(nodes)),
        None => Ok(input.clone()),
    }
}

/// Elements of a loop-mode input; `null` loops over nothing
pub(crate) fn loop_items(input: Value) -> Result<Vec<Value>> {
    match input {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(RuntimeError::expression(
            0,
            format!("Loop execution requires an array input, got {}", other.type_name()),
        )),
    }
}

/// Final node output from the body output and the node's original input
pub(crate) fn shape_output(transform: &CompiledTransform, input: &Value, output: Value) -> Value {
    let output = match &transform.output_path {
        Some(path) => {
            let mut nested = Value::object();
            nested.dot_insert(path, output);
            nested
        }
        None => output,
    };

    if transform.pass_through {
        input.merged(&output)
    } else {
        output
    }
}
