//! Decision table evaluator
//!
//! Rows are matched top to bottom. A column bound to a field evaluates its
//! cells as unary expressions with `$` set to the field's value; a column
//! without a field evaluates its cells as standalone conditions. Empty
//! cells always match, and a column's field is only evaluated once some
//! row has a non-empty cell for it.

use super::NodeOutput;
use crate::engine::{Interpreter, Scope};
use crate::error::Result;
use verdict_core::ir::{CompiledRule, CompiledTable, SourceExpression};
use verdict_core::model::HitPolicy;
use verdict_core::types::Map;
use verdict_core::Value;

pub(crate) fn evaluate(
    interpreter: &Interpreter,
    table: &CompiledTable,
    input: &Value,
    nodes: Option<&Value>,
) -> Result<NodeOutput> {
    let scope = Scope::new(input).with_nodes(nodes);
    let mut subjects = Subjects::new(table.inputs.len());

    let mut matches = Vec::new();
    for (index, rule) in table.rules.iter().enumerate() {
        if !row_matches(interpreter, table, rule, &mut subjects, scope)? {
            continue;
        }

        tracing::debug!(row = index, rule = ?rule.id, "table row matched");
        let output = row_output(interpreter, table, rule, scope)?;
        matches.push((index, rule, output));

        if table.hit_policy == HitPolicy::First {
            break;
        }
    }

    let result = match table.hit_policy {
        HitPolicy::First => match matches.pop() {
            Some((index, rule, output)) => NodeOutput::new(output, rule_trace(index, rule)),
            None => NodeOutput::new(Value::object(), Value::Null),
        },
        HitPolicy::Collect => {
            let traces = matches
                .iter()
                .map(|(index, rule, _)| rule_trace(*index, rule))
                .collect();
            let outputs = matches.into_iter().map(|(_, _, output)| output).collect();
            NodeOutput::new(Value::Array(outputs), Value::Array(traces))
        }
    };
    Ok(result)
}

/// Column field values, evaluated on first use and shared by later rows.
///
/// A field that fails to evaluate is remembered as `None`; every row with a
/// condition on that column then fails to match.
struct Subjects {
    values: Vec<Option<Option<Value>>>,
}

impl Subjects {
    fn new(columns: usize) -> Self {
        Self {
            values: vec![None; columns],
        }
    }

    fn get(
        &mut self,
        interpreter: &Interpreter,
        column: usize,
        field: &SourceExpression,
        scope: Scope<'_>,
    ) -> Option<&Value> {
        self.values[column]
            .get_or_insert_with(|| match interpreter.evaluate(&field.expression, scope) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::debug!(field = %field.source, error = %err, "table column field failed");
                    None
                }
            })
            .as_ref()
    }
}

fn row_matches(
    interpreter: &Interpreter,
    table: &CompiledTable,
    rule: &CompiledRule,
    subjects: &mut Subjects,
    scope: Scope<'_>,
) -> Result<bool> {
    for (column, (input, cell)) in table.inputs.iter().zip(&rule.conditions).enumerate() {
        let Some(cell) = cell else {
            continue;
        };
        let matched = match &input.field {
            Some(field) => match subjects.get(interpreter, column, field, scope) {
                Some(subject) => interpreter.evaluate_unary(&cell.expression, scope.with_subject(subject))?,
                None => false,
            },
            None => interpreter.evaluate_condition(&cell.expression, scope)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn row_output(
    interpreter: &Interpreter,
    table: &CompiledTable,
    rule: &CompiledRule,
    scope: Scope<'_>,
) -> Result<Value> {
    let mut output = Value::object();
    for (column, cell) in table.outputs.iter().zip(&rule.outputs) {
        if let Some(cell) = cell {
            let value = interpreter.evaluate(&cell.expression, scope)?;
            output.dot_insert(&column.field, value);
        }
    }
    Ok(output)
}

fn rule_trace(index: usize, rule: &CompiledRule) -> Value {
    let mut meta = Map::new();
    if let Some(id) = &rule.id {
        meta.insert("_id".to_string(), Value::from(id.as_str()));
    }
    if let Some(description) = &rule.description {
        meta.insert("_description".to_string(), Value::from(description.as_str()));
    }

    let mut trace = Map::new();
    trace.insert("index".to_string(), Value::from(index));
    trace.insert("rule".to_string(), Value::Object(meta));
    Value::Object(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use serde_json::json;
    use verdict_core::ir::{CompiledTableInput, CompiledTableOutput};
    use verdict_parser::{ExpressionParser, UnaryParser};

    fn standard(source: &str) -> Option<SourceExpression> {
        (!source.trim().is_empty())
            .then(|| SourceExpression::new(source, ExpressionParser::parse(source).unwrap()))
    }

    fn unary(source: &str) -> Option<SourceExpression> {
        UnaryParser::parse(source)
            .unwrap()
            .map(|e| SourceExpression::new(source, e))
    }

    /// Table over `input` with one output column `output`
    fn fee_table(hit_policy: HitPolicy, rows: &[(&str, &str, &str)]) -> CompiledTable {
        CompiledTable {
            hit_policy,
            inputs: vec![CompiledTableInput {
                id: "c1".to_string(),
                name: "Input".to_string(),
                field: standard("input"),
            }],
            outputs: vec![CompiledTableOutput {
                id: "o1".to_string(),
                name: "Output".to_string(),
                field: "output".to_string(),
            }],
            rules: rows
                .iter()
                .map(|(id, cell, out)| CompiledRule {
                    id: Some(id.to_string()),
                    description: None,
                    conditions: vec![unary(cell)],
                    outputs: vec![standard(out)],
                })
                .collect(),
        }
    }

    fn run(table: &CompiledTable, input: serde_json::Value) -> Result<NodeOutput> {
        evaluate(&Interpreter::default(), table, &Value::from(input), None)
    }

    #[test]
    fn test_first_hit() {
        let table = fee_table(HitPolicy::First, &[("r1", "< 10", "0"), ("r2", ">= 10", "10")]);

        let low = run(&table, json!({"input": 2})).unwrap();
        assert_eq!(low.output, Value::from(json!({"output": 0})));
        assert_eq!(low.trace_data, Value::from(json!({"index": 0, "rule": {"_id": "r1"}})));

        let high = run(&table, json!({"input": 12})).unwrap();
        assert_eq!(high.output, Value::from(json!({"output": 10})));
    }

    #[test]
    fn test_first_hit_ignores_non_matching_row_order() {
        let forward = fee_table(HitPolicy::First, &[("a", "> 100", "'a'"), ("b", "[1..5]", "'b'"), ("c", "< 0", "'c'")]);
        let reversed = fee_table(HitPolicy::First, &[("c", "< 0", "'c'"), ("b", "[1..5]", "'b'"), ("a", "> 100", "'a'")]);

        let input = json!({"input": 3});
        assert_eq!(run(&forward, input.clone()).unwrap().output, run(&reversed, input).unwrap().output);
    }

    #[test]
    fn test_first_without_match_is_empty() {
        let table = fee_table(HitPolicy::First, &[("r1", "> 100", "1")]);
        let result = run(&table, json!({"input": 2})).unwrap();
        assert_eq!(result.output, Value::object());
        assert_eq!(result.trace_data, Value::Null);
    }

    #[test]
    fn test_collect_in_row_order() {
        let table = fee_table(HitPolicy::Collect, &[("r1", "> 1", "'a'"), ("r2", "", "'b'"), ("r3", "> 50", "'c'")]);

        let result = run(&table, json!({"input": 5})).unwrap();
        assert_eq!(result.output, Value::from(json!([{"output": "a"}, {"output": "b"}])));
        assert_eq!(result.trace_data.as_array().map(Vec::len), Some(2));

        let none = fee_table(HitPolicy::Collect, &[("r1", "> 100", "1")]);
        assert_eq!(run(&none, json!({"input": 5})).unwrap().output, Value::Array(vec![]));
    }

    #[test]
    fn test_column_without_field_and_nested_output() {
        let table = CompiledTable {
            hit_policy: HitPolicy::First,
            inputs: vec![CompiledTableInput {
                id: "c1".to_string(),
                name: "Check".to_string(),
                field: None,
            }],
            outputs: vec![
                CompiledTableOutput {
                    id: "o1".to_string(),
                    name: "Tier".to_string(),
                    field: "customer.tier".to_string(),
                },
                CompiledTableOutput {
                    id: "o2".to_string(),
                    name: "Note".to_string(),
                    field: "note".to_string(),
                },
            ],
            rules: vec![CompiledRule {
                id: None,
                description: Some("vip".to_string()),
                conditions: vec![standard("vip == true and age >= 18")],
                outputs: vec![standard("'gold'"), None],
            }],
        };

        let result = run(&table, json!({"vip": true, "age": 30})).unwrap();
        assert_eq!(result.output, Value::from(json!({"customer": {"tier": "gold"}})));
        assert_eq!(result.trace_data, Value::from(json!({"index": 0, "rule": {"_description": "vip"}})));
    }

    #[test]
    fn test_non_boolean_cell_is_unary_error() {
        let mut table = fee_table(HitPolicy::First, &[("r1", "", "1")]);
        table.rules[0].conditions = vec![Some(SourceExpression::new(
            "$ + 1",
            ExpressionParser::parse("$ + 1").unwrap(),
        ))];

        let err = run(&table, json!({"input": 1})).unwrap_err();
        assert!(matches!(err, RuntimeError::UnaryExpression(_)));
    }

    #[test]
    fn test_wildcard_column_over_missing_field() {
        let table = fee_table(HitPolicy::First, &[("r1", "", "'default'")]);

        let result = run(&table, json!({"other": 1})).unwrap();
        assert_eq!(result.output, Value::from(json!({"output": "default"})));
    }

    #[test]
    fn test_failing_field_skips_conditioned_rows() {
        let table = fee_table(HitPolicy::Collect, &[("r1", "> 10", "'high'"), ("r2", "", "'fallback'")]);

        let result = run(&table, json!({"other": 1})).unwrap();
        assert_eq!(result.output, Value::from(json!([{"output": "fallback"}])));
        assert_eq!(
            result.trace_data,
            Value::from(json!([{"index": 1, "rule": {"_id": "r2"}}]))
        );
    }
}
