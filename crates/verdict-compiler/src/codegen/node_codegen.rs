//! Node compiler
//!
//! Turns each node's document content into its `CompiledNodeKind`.

use super::expression_codegen::ExpressionCompiler;
use crate::error::Result;
use verdict_core::ir::{
    CompiledExpressionEntry, CompiledNodeKind, CompiledRule, CompiledStatement, CompiledTable,
    CompiledTableInput, CompiledTableOutput, CompiledTransform,
};
use verdict_core::model::{DecisionNode, DecisionTableContent, NodeKind, TransformAttributes};

const RULE_ID: &str = "_id";
const RULE_DESCRIPTION: &str = "_description";

/// Node compiler
pub struct NodeCompiler;

impl NodeCompiler {
    pub fn compile(node: &DecisionNode) -> Result<CompiledNodeKind> {
        let id = node.id.as_str();

        let kind = match &node.kind {
            NodeKind::Input(content) => CompiledNodeKind::Input {
                schema: ExpressionCompiler::schema(id, content.schema.as_ref())?,
                advisory: content.advisory,
            },

            NodeKind::Output(content) => CompiledNodeKind::Output {
                schema: ExpressionCompiler::schema(id, content.schema.as_ref())?,
            },

            NodeKind::Expression(content) => {
                let expressions = content
                    .expressions
                    .iter()
                    .filter(|entry| !entry.key.trim().is_empty())
                    .map(|entry| {
                        Ok(CompiledExpressionEntry {
                            key: entry.key.trim().to_string(),
                            value: ExpressionCompiler::standard(id, &entry.value)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                CompiledNodeKind::Expression {
                    expressions,
                    transform: Self::transform(id, &content.transform)?,
                }
            }

            NodeKind::DecisionTable(content) => CompiledNodeKind::DecisionTable {
                table: Self::table(id, content)?,
                transform: Self::transform(id, &content.transform)?,
            },

            NodeKind::Switch(content) => CompiledNodeKind::Switch {
                hit_policy: content.hit_policy,
                statements: content
                    .statements
                    .iter()
                    .map(|statement| {
                        Ok(CompiledStatement {
                            id: statement.id.clone(),
                            condition: ExpressionCompiler::optional(id, &statement.condition)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            },

            NodeKind::Decision(content) => CompiledNodeKind::Decision {
                key: content.key.trim().to_string(),
                transform: Self::transform(id, &content.transform)?,
            },

            NodeKind::Custom(content) => CompiledNodeKind::Custom {
                kind: content.kind.clone(),
                config: content.config.clone(),
                non_fatal: content.non_fatal,
                transform: Self::transform(id, &content.transform)?,
            },
        };

        Ok(kind)
    }

    fn transform(node_id: &str, attributes: &TransformAttributes) -> Result<CompiledTransform> {
        let input_field = match attributes.input_field.as_deref() {
            Some(source) => ExpressionCompiler::optional(node_id, source)?,
            None => None,
        };

        Ok(CompiledTransform {
            input_field,
            output_path: attributes
                .output_path
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            execution_mode: attributes.execution_mode,
            pass_through: attributes.pass_through,
        })
    }

    fn table(node_id: &str, content: &DecisionTableContent) -> Result<CompiledTable> {
        let inputs = content
            .inputs
            .iter()
            .map(|column| {
                let field = match column.field.as_deref() {
                    Some(source) => ExpressionCompiler::optional(node_id, source)?,
                    None => None,
                };
                Ok(CompiledTableInput {
                    id: column.id.clone(),
                    name: column.name.clone(),
                    field,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let outputs: Vec<CompiledTableOutput> = content
            .outputs
            .iter()
            .map(|column| CompiledTableOutput {
                id: column.id.clone(),
                name: column.name.clone(),
                field: column.field.trim().to_string(),
            })
            .collect();

        let mut rules = Vec::with_capacity(content.rules.len());
        for row in &content.rules {
            let conditions = inputs
                .iter()
                .map(|column| {
                    let cell = row.get(&column.id).map(String::as_str).unwrap_or_default();
                    // Columns bound to a field hold unary cells; the rest hold
                    // standalone boolean expressions
                    if column.field.is_some() {
                        ExpressionCompiler::unary(node_id, cell)
                    } else {
                        ExpressionCompiler::optional(node_id, cell)
                    }
                })
                .collect::<Result<Vec<_>>>()?;

            let cells = outputs
                .iter()
                .map(|column| {
                    let cell = row.get(&column.id).map(String::as_str).unwrap_or_default();
                    ExpressionCompiler::optional(node_id, cell)
                })
                .collect::<Result<Vec<_>>>()?;

            rules.push(CompiledRule {
                id: row.get(RULE_ID).cloned(),
                description: row.get(RULE_DESCRIPTION).cloned(),
                conditions,
                outputs: cells,
            });
        }

        Ok(CompiledTable {
            hit_policy: content.hit_policy,
            inputs,
            outputs,
            rules,
        })
    }
}
