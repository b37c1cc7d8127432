//! Switch node
//!
//! Selects statement ids; the executor keeps only outgoing edges whose
//! handle was selected. A statement without a condition is the default
//! branch, taken when no other statement matched.

use crate::engine::{Interpreter, Scope};
use crate::error::Result;
use verdict_core::ir::CompiledStatement;
use verdict_core::model::SwitchHitPolicy;
use verdict_core::Value;

pub(crate) fn select(
    interpreter: &Interpreter,
    hit_policy: SwitchHitPolicy,
    statements: &[CompiledStatement],
    input: &Value,
    nodes: Option<&Value>,
) -> Result<Vec<String>> {
    let scope = Scope::new(input).with_nodes(nodes);
    let mut selected = Vec::new();
    let mut default = None;

    for statement in statements {
        let Some(condition) = &statement.condition else {
            if default.is_none() {
                default = Some(statement.id.clone());
            }
            continue;
        };
        if interpreter.evaluate_condition(&condition.expression, scope)? {
            selected.push(statement.id.clone());
            if hit_policy == SwitchHitPolicy::First {
                break;
            }
        }
    }

    if selected.is_empty() {
        selected.extend(default);
    }
    tracing::debug!(?selected, "switch statements selected");
    Ok(selected)
}
