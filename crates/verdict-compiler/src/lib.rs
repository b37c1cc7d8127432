//! Verdict Compiler - decision document to executable graph
//!
//! This crate validates decision documents and compiles them into the
//! `CompiledDecision` IR executed by the runtime.

pub mod codegen;
pub mod compiler;
pub mod error;
pub mod semantic;

// Re-export main types
pub use compiler::Compiler;
pub use error::{CompileError, Result};
pub use semantic::{GraphAnalyzer, Warning};
