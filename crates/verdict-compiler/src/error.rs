//! Compiler error types

use thiserror::Error;
use verdict_parser::ParseError;

/// Compiler error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The document bytes are not a well-formed decision document
    #[error("Failed to parse decision document: {0}")]
    DocumentParse(#[from] ParseError),

    /// The graph or a node configuration violates a structural rule
    #[error("[{code}] {message}")]
    GraphValidation {
        code: &'static str,
        node_id: Option<String>,
        message: String,
    },

    /// An expression embedded in a node failed to parse
    #[error("[E010] Invalid expression '{expression}' in node '{node_id}': {source}")]
    InvalidExpression {
        node_id: String,
        expression: String,
        source: ParseError,
    },
}

impl CompileError {
    pub(crate) fn graph(code: &'static str, node_id: Option<&str>, message: impl Into<String>) -> Self {
        CompileError::GraphValidation {
            code,
            node_id: node_id.map(str::to_string),
            message: message.into(),
        }
    }

    /// Id of the node the error points at, when there is one
    pub fn node_id(&self) -> Option<&str> {
        match self {
            CompileError::DocumentParse(_) => None,
            CompileError::GraphValidation { node_id, .. } => node_id.as_deref(),
            CompileError::InvalidExpression { node_id, .. } => Some(node_id),
        }
    }

    /// Diagnostic code, `None` for document parse failures
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CompileError::DocumentParse(_) => None,
            CompileError::GraphValidation { code, .. } => Some(code),
            CompileError::InvalidExpression { .. } => Some("E010"),
        }
    }
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
