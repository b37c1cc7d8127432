//! Compiled decision graph
//!
//! A `CompiledDecision` is the validated, executable form of a decision
//! document. Node content is already parsed into expression trees and
//! schemas, nodes reference each other by index, and the topological order
//! is fixed. It is immutable and shared between evaluations.

use crate::ast::Expression;
use crate::model::{ExecutionMode, HitPolicy, SwitchHitPolicy};
use crate::types::{Schema, Value};

/// An expression together with the source text it was parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceExpression {
    pub source: String,
    pub expression: Expression,
}

impl SourceExpression {
    pub fn new(source: impl Into<String>, expression: Expression) -> Self {
        Self {
            source: source.into(),
            expression,
        }
    }
}

/// Executable decision graph
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDecision {
    pub nodes: Vec<CompiledNode>,
    pub edges: Vec<CompiledEdge>,
    /// Node indexes in topological order
    pub order: Vec<usize>,
    /// Index of the input node
    pub input: usize,
    /// Index of the output node
    pub output: usize,
}

impl CompiledDecision {
    pub fn node(&self, index: usize) -> Option<&CompiledNode> {
        self.nodes.get(index)
    }

    /// Find a node by its document id
    pub fn node_by_id(&self, id: &str) -> Option<&CompiledNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Indexes of the nodes feeding `index`, ordered by topological position
    pub fn predecessors(&self, index: usize) -> Vec<usize> {
        let Some(node) = self.nodes.get(index) else {
            return Vec::new();
        };
        let mut sources: Vec<usize> = node
            .incoming
            .iter()
            .filter_map(|&e| self.edges.get(e).map(|edge| edge.source))
            .collect();
        sources.sort_by_key(|s| self.rank(*s));
        sources.dedup();
        sources
    }

    /// Position of a node in the topological order
    pub fn rank(&self, index: usize) -> usize {
        self.order
            .iter()
            .position(|&i| i == index)
            .unwrap_or(usize::MAX)
    }
}

/// Edge between two node indexes
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEdge {
    pub id: String,
    pub source: usize,
    pub target: usize,
    pub source_handle: Option<String>,
}

/// Node with parsed configuration and adjacency
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledNode {
    pub id: String,
    pub name: String,
    pub kind: CompiledNodeKind,
    /// Incoming edge indexes
    pub incoming: Vec<usize>,
    /// Outgoing edge indexes
    pub outgoing: Vec<usize>,
}

/// Node semantics, one variant per node kind
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledNodeKind {
    Input {
        schema: Option<Schema>,
        advisory: bool,
    },
    Output {
        schema: Option<Schema>,
    },
    Expression {
        expressions: Vec<CompiledExpressionEntry>,
        transform: CompiledTransform,
    },
    DecisionTable {
        table: CompiledTable,
        transform: CompiledTransform,
    },
    Switch {
        hit_policy: SwitchHitPolicy,
        statements: Vec<CompiledStatement>,
    },
    Decision {
        key: String,
        transform: CompiledTransform,
    },
    Custom {
        kind: String,
        config: Value,
        non_fatal: bool,
        transform: CompiledTransform,
    },
}

impl CompiledNodeKind {
    /// Wire name of the node kind
    pub fn type_name(&self) -> &'static str {
        match self {
            CompiledNodeKind::Input { .. } => "inputNode",
            CompiledNodeKind::Output { .. } => "outputNode",
            CompiledNodeKind::Expression { .. } => "expressionNode",
            CompiledNodeKind::DecisionTable { .. } => "decisionTableNode",
            CompiledNodeKind::Switch { .. } => "switchNode",
            CompiledNodeKind::Decision { .. } => "decisionNode",
            CompiledNodeKind::Custom { .. } => "customNode",
        }
    }

    pub fn transform(&self) -> Option<&CompiledTransform> {
        match self {
            CompiledNodeKind::Expression { transform, .. }
            | CompiledNodeKind::DecisionTable { transform, .. }
            | CompiledNodeKind::Decision { transform, .. }
            | CompiledNodeKind::Custom { transform, .. } => Some(transform),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpressionEntry {
    pub key: String,
    pub value: SourceExpression,
}

/// Transform attributes with `inputField` pre-parsed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledTransform {
    pub input_field: Option<SourceExpression>,
    pub output_path: Option<String>,
    pub execution_mode: ExecutionMode,
    pub pass_through: bool,
}

impl CompiledTransform {
    /// True when the transform leaves input and output untouched
    pub fn is_identity(&self) -> bool {
        self.input_field.is_none()
            && self.output_path.is_none()
            && self.execution_mode == ExecutionMode::Single
            && !self.pass_through
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTable {
    pub hit_policy: HitPolicy,
    pub inputs: Vec<CompiledTableInput>,
    pub outputs: Vec<CompiledTableOutput>,
    pub rules: Vec<CompiledRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTableInput {
    pub id: String,
    pub name: String,
    /// Expression bound to `$`; cells of columns without a field are
    /// standalone boolean expressions
    pub field: Option<SourceExpression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTableOutput {
    pub id: String,
    pub name: String,
    pub field: String,
}

/// A table row, cells aligned with the table's inputs and outputs
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub id: Option<String>,
    pub description: Option<String>,
    /// `None` marks a wildcard cell
    pub conditions: Vec<Option<SourceExpression>>,
    /// `None` marks an empty output cell
    pub outputs: Vec<Option<SourceExpression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub id: String,
    /// `None` marks the default branch
    pub condition: Option<SourceExpression>,
}
