//! Code generation module
//!
//! This module contains code generators that transform the document model
//! into the executable IR.

pub mod expression_codegen;
pub mod graph_codegen;
pub mod node_codegen;

pub use expression_codegen::ExpressionCompiler;
pub use graph_codegen::GraphCompiler;
pub use node_codegen::NodeCompiler;
