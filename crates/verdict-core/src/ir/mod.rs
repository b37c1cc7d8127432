//! Intermediate Representation (IR) for verdict
//!
//! The IR is the compiled, execution-ready form of a decision document.

pub mod decision;

pub use decision::{
    CompiledDecision, CompiledEdge, CompiledExpressionEntry, CompiledNode, CompiledNodeKind,
    CompiledRule, CompiledStatement, CompiledTable, CompiledTableInput, CompiledTableOutput,
    CompiledTransform, SourceExpression,
};
