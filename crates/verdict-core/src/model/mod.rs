//! Decision document model
//!
//! The serde representation of a decision document: a JSON object holding
//! `nodes` and `edges`. Node content is typed per node kind when the document
//! is read, so malformed content is rejected before compilation starts.

pub mod content;
pub mod document;

pub use content::{
    CustomNodeContent, DecisionNodeContent, DecisionTableContent, ExecutionMode,
    ExpressionEntry, ExpressionNodeContent, HitPolicy, InputNodeContent, OutputNodeContent,
    SwitchHitPolicy, SwitchNodeContent, SwitchStatement, TableInputColumn, TableOutputColumn,
    TransformAttributes,
};
pub use document::{DecisionDocument, DecisionEdge, DecisionNode, NodeKind};
