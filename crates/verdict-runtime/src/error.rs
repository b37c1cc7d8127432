//! Runtime error types

use std::fmt;
use thiserror::Error;

/// Step of sub-decision resolution that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// The loader could not provide the document
    Fetch,
    /// The document bytes are malformed
    Parse,
    /// The document failed graph validation
    Validate,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoadStage::Fetch => "load",
            LoadStage::Parse => "parse",
            LoadStage::Validate => "validate",
        })
    }
}

/// Runtime error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Expression failed to parse or evaluate
    #[error("Expression error at position {position}: {message}")]
    Expression { position: usize, message: String },

    /// Unary expression is malformed or did not produce a boolean
    #[error("Unary expression error: {0}")]
    UnaryExpression(String),

    /// Unary expression evaluated without `$` in context
    #[error("Unary expression requires '$' in context")]
    MissingSubject,

    /// Input or output does not match the node's schema
    #[error("Validation failed: {0}")]
    InputValidation(String),

    /// Sub-decisions nested deeper than allowed
    #[error("Recursion limit of {limit} exceeded while evaluating '{key}'")]
    RecursionLimit { key: String, limit: usize },

    /// Sub-decision could not be resolved
    #[error("Failed to {stage} decision '{key}': {message}")]
    Load {
        key: String,
        stage: LoadStage,
        message: String,
    },

    /// Custom node handler returned an error
    #[error("Custom handler failed for node '{node_id}': {cause}")]
    CustomHandler { node_id: String, cause: String },

    /// A custom node was reached but no handler is configured
    #[error("No custom node handler configured")]
    NoHandlerConfigured,

    /// Error raised while executing a node
    #[error("Node '{node_id}' failed: {source}")]
    Node {
        node_id: String,
        source: Box<RuntimeError>,
    },
}

impl RuntimeError {
    pub(crate) fn expression(position: usize, message: impl Into<String>) -> Self {
        RuntimeError::Expression {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn in_node(self, node_id: &str) -> Self {
        RuntimeError::Node {
            node_id: node_id.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with node wrappers removed
    pub fn root(&self) -> &RuntimeError {
        match self {
            RuntimeError::Node { source, .. } => source.root(),
            other => other,
        }
    }

    /// Id of the innermost node the error was raised in
    pub fn node_id(&self) -> Option<&str> {
        match self {
            RuntimeError::Node { node_id, source } => source.node_id().or(Some(node_id.as_str())),
            RuntimeError::CustomHandler { node_id, .. } => Some(node_id.as_str()),
            _ => None,
        }
    }

    /// Node ids from the outermost decision down to the failing node
    pub fn node_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let RuntimeError::Node { node_id, source } = current {
            path.push(node_id.as_str());
            current = source;
        }
        path
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
