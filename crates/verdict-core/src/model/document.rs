//! Decision document, nodes and edges

use super::content::*;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// A decision document as stored and exchanged
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionDocument {
    #[serde(default)]
    pub nodes: Vec<DecisionNode>,

    #[serde(default)]
    pub edges: Vec<DecisionEdge>,
}

/// Directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionEdge {
    pub id: String,

    #[serde(alias = "sourceId")]
    pub source_node_id: String,

    #[serde(alias = "targetId")]
    pub target_node_id: String,

    /// Switch statement id this edge is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
}

/// A node with its typed content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct DecisionNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
}

/// Closed set of node kinds, one variant per `type` string
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Input(InputNodeContent),
    Output(OutputNodeContent),
    Expression(ExpressionNodeContent),
    DecisionTable(DecisionTableContent),
    Switch(SwitchNodeContent),
    Decision(DecisionNodeContent),
    Custom(CustomNodeContent),
}

impl NodeKind {
    /// Wire name of the node kind
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Input(_) => "inputNode",
            NodeKind::Output(_) => "outputNode",
            NodeKind::Expression(_) => "expressionNode",
            NodeKind::DecisionTable(_) => "decisionTableNode",
            NodeKind::Switch(_) => "switchNode",
            NodeKind::Decision(_) => "decisionNode",
            NodeKind::Custom(_) => "customNode",
        }
    }
}

/// Untyped node as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    content: serde_json::Value,
}

fn content<T: serde::de::DeserializeOwned>(raw: &RawNode) -> Result<T, CoreError> {
    let content = match &raw.content {
        serde_json::Value::Null => serde_json::Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(content).map_err(|e| {
        CoreError::InvalidValue(format!(
            "invalid content for {} '{}': {}",
            raw.node_type, raw.id, e
        ))
    })
}

impl TryFrom<RawNode> for DecisionNode {
    type Error = CoreError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let kind = match raw.node_type.as_str() {
            "inputNode" => NodeKind::Input(content(&raw)?),
            "outputNode" => NodeKind::Output(content(&raw)?),
            "expressionNode" => NodeKind::Expression(content(&raw)?),
            "decisionTableNode" => NodeKind::DecisionTable(content(&raw)?),
            "switchNode" => NodeKind::Switch(content(&raw)?),
            "decisionNode" => NodeKind::Decision(content(&raw)?),
            "customNode" => NodeKind::Custom(content(&raw)?),
            other => {
                return Err(CoreError::InvalidValue(format!(
                    "unknown node type '{}' for node '{}'",
                    other, raw.id
                )))
            }
        };

        Ok(DecisionNode {
            id: raw.id,
            name: raw.name,
            kind,
        })
    }
}

impl From<DecisionNode> for RawNode {
    fn from(node: DecisionNode) -> Self {
        let node_type = node.kind.type_name().to_string();
        let content = match node.kind {
            NodeKind::Input(c) => serde_json::to_value(c),
            NodeKind::Output(c) => serde_json::to_value(c),
            NodeKind::Expression(c) => serde_json::to_value(c),
            NodeKind::DecisionTable(c) => serde_json::to_value(c),
            NodeKind::Switch(c) => serde_json::to_value(c),
            NodeKind::Decision(c) => serde_json::to_value(c),
            NodeKind::Custom(c) => serde_json::to_value(c),
        }
        .unwrap_or(serde_json::Value::Null);

        RawNode {
            id: node.id,
            name: node.name,
            node_type,
            content,
        }
    }
}
