//! Kind-specific node content

use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attributes shared by nodes whose input and output can be reshaped
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformAttributes {
    /// Expression selecting the node's input from the incoming context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_field: Option<String>,

    /// Dot path under which the node's output is nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,

    #[serde(default)]
    pub execution_mode: ExecutionMode,

    /// Merge the node's input into its output
    #[serde(default)]
    pub pass_through: bool,
}

/// How a node consumes its input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionMode {
    /// Evaluate once against the whole input
    #[default]
    Single,
    /// Evaluate once per element of an array input
    Loop,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputNodeContent {
    /// JSON Schema, either inline or as a JSON string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,

    /// Log schema violations instead of failing
    #[serde(default)]
    pub advisory: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputNodeContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionNodeContent {
    #[serde(default)]
    pub expressions: Vec<ExpressionEntry>,

    #[serde(flatten)]
    pub transform: TransformAttributes,
}

/// One `key = value` line of an expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionEntry {
    #[serde(default)]
    pub id: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTableContent {
    /// Rows keyed by column id; `_id` and `_description` carry row metadata
    #[serde(default)]
    pub rules: Vec<BTreeMap<String, String>>,

    #[serde(default)]
    pub inputs: Vec<TableInputColumn>,

    #[serde(default)]
    pub outputs: Vec<TableOutputColumn>,

    #[serde(default)]
    pub hit_policy: HitPolicy,

    #[serde(flatten)]
    pub transform: TransformAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInputColumn {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Expression providing `$` for this column's cells
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOutputColumn {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Dot path written in the row output
    pub field: String,
}

/// Decision table hit policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HitPolicy {
    /// First matching row wins
    #[default]
    First,
    /// All matching rows, in row order
    Collect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchNodeContent {
    #[serde(default)]
    pub hit_policy: SwitchHitPolicy,

    #[serde(default)]
    pub statements: Vec<SwitchStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStatement {
    pub id: String,
    /// Empty condition marks the default branch
    #[serde(default)]
    pub condition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwitchHitPolicy {
    #[default]
    First,
    Collect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionNodeContent {
    /// Key of the nested decision, resolved through the loader
    pub key: String,

    #[serde(flatten)]
    pub transform: TransformAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomNodeContent {
    /// Handler-defined discriminator
    pub kind: String,

    #[serde(default)]
    pub config: Value,

    /// Handler failures produce an empty output instead of aborting
    #[serde(default)]
    pub non_fatal: bool,

    #[serde(flatten)]
    pub transform: TransformAttributes,
}
