//! Main compiler
//!
//! Parses, analyzes and generates code for a decision document in one call.

use crate::codegen::GraphCompiler;
use crate::error::Result;
use crate::semantic::{GraphAnalyzer, Warning};
use verdict_core::ir::CompiledDecision;
use verdict_core::model::DecisionDocument;
use verdict_parser::DocumentParser;

/// The decision compiler
#[derive(Debug, Clone, Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile raw document bytes
    pub fn compile(&self, bytes: &[u8]) -> Result<CompiledDecision> {
        let document = DocumentParser::parse(bytes)?;
        self.compile_document(&document)
    }

    /// Compile an already parsed document
    pub fn compile_document(&self, document: &DecisionDocument) -> Result<CompiledDecision> {
        let warnings = self.analyze(document)?;
        if !warnings.is_empty() {
            tracing::debug!(count = warnings.len(), "decision compiled with warnings");
        }
        GraphCompiler::compile(document)
    }

    /// Run semantic analysis only
    pub fn analyze(&self, document: &DecisionDocument) -> Result<Vec<Warning>> {
        GraphAnalyzer::analyze(document)
    }
}
