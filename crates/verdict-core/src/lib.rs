//! Verdict Core - Core types and definitions for the verdict decision engine
//!
//! This crate provides the fundamental types used across the verdict crates:
//! - Value types for runtime data
//! - AST (Abstract Syntax Tree) definitions for the expression language
//! - The decision document model
//! - IR (Intermediate Representation) for compiled decisions
//! - Error types

pub mod ast;
pub mod error;
pub mod ir;
pub mod model;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use ir::CompiledDecision;
pub use model::DecisionDocument;
pub use types::Value;
