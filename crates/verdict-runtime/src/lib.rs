//! Verdict Runtime - Execution engine for compiled decisions
//!
//! This crate provides the expression interpreter, the per-node evaluators
//! and the graph executor. The executor reaches loaders and custom node
//! handlers only through the `DecisionHost` capability.

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod host;
mod nodes;
pub mod result;
pub mod standalone;
pub mod template;

// Re-export main types
pub use config::{ExecutionOptions, Scheduling, ZeroDivisionPolicy};
pub use engine::{Interpreter, Scope};
pub use error::{LoadStage, Result, RuntimeError};
pub use executor::GraphExecutor;
pub use host::{CustomNodeRequest, DecisionHost};
pub use result::{DecisionResponse, NodeTrace};
pub use standalone::{
    evaluate_expression, evaluate_expression_with, evaluate_unary_expression,
    evaluate_unary_expression_with, render_template, render_template_with,
};
