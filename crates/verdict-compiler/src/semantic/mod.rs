//! Semantic analysis module
//!
//! Structural validation of decision graphs before code generation.

pub mod graph_analyzer;

pub use graph_analyzer::{GraphAnalyzer, Warning};
