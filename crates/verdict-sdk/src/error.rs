//! SDK error types
//!
//! Every failure surfaced by the engine is one of the variants below.
//! Runtime errors raised inside a node keep the id of the innermost node.

use thiserror::Error;
use verdict_compiler::CompileError;
use verdict_repository::RepositoryError;
use verdict_runtime::{LoadStage, RuntimeError};

/// SDK error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdkError {
    /// The loader could not provide the document
    #[error("Failed to load decision '{key}': {cause}")]
    DocumentLoad { key: String, cause: String },

    /// The document is not well-formed
    #[error("Failed to parse decision document: {0}")]
    DocumentParse(String),

    /// The document failed graph validation
    #[error("Invalid decision graph: {0}")]
    GraphValidation(String),

    /// Expression failed to parse or evaluate
    #[error("Expression error{} at position {position}: {message}", located(.node_id))]
    Expression {
        node_id: Option<String>,
        position: usize,
        message: String,
    },

    /// Unary expression is malformed or not boolean
    #[error("Unary expression error{}: {message}", located(.node_id))]
    UnaryExpression {
        node_id: Option<String>,
        message: String,
    },

    /// Unary expression evaluated without `$`
    #[error("Unary expression requires '$' in context")]
    MissingSubject,

    /// Input or output failed schema validation
    #[error("Input validation failed{}: {message}", located(.node_id))]
    InputValidation {
        node_id: Option<String>,
        message: String,
    },

    /// Sub-decisions nested deeper than `max_depth`
    #[error("Recursion limit of {limit} exceeded while evaluating '{key}'")]
    RecursionLimit { key: String, limit: usize },

    /// Custom node handler failed
    #[error("Custom handler failed for node '{node_id}': {cause}")]
    CustomHandler { node_id: String, cause: String },

    /// A custom node was reached without a handler for the evaluation mode
    #[error("No custom node handler configured{}", located(.node_id))]
    NoHandlerConfigured { node_id: Option<String> },
}

fn located(node_id: &Option<String>) -> String {
    match node_id {
        Some(id) => format!(" in node '{id}'"),
        None => String::new(),
    }
}

impl SdkError {
    /// Taxonomy name of the error
    pub fn kind(&self) -> &'static str {
        match self {
            SdkError::DocumentLoad { .. } => "DocumentLoadError",
            SdkError::DocumentParse(_) => "DocumentParseError",
            SdkError::GraphValidation(_) => "GraphValidationError",
            SdkError::Expression { .. } => "ExpressionError",
            SdkError::UnaryExpression { .. } => "UnaryExpressionError",
            SdkError::MissingSubject => "MissingSubjectError",
            SdkError::InputValidation { .. } => "InputValidationError",
            SdkError::RecursionLimit { .. } => "RecursionLimitError",
            SdkError::CustomHandler { .. } => "CustomHandlerError",
            SdkError::NoHandlerConfigured { .. } => "NoHandlerConfiguredError",
        }
    }

    /// Id of the node the error was raised in, when known
    pub fn node_id(&self) -> Option<&str> {
        match self {
            SdkError::Expression { node_id, .. }
            | SdkError::UnaryExpression { node_id, .. }
            | SdkError::InputValidation { node_id, .. }
            | SdkError::NoHandlerConfigured { node_id } => node_id.as_deref(),
            SdkError::CustomHandler { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    /// Runtime form of a resolution failure, used when a nested decision
    /// cannot be resolved during evaluation
    pub(crate) fn into_load_error(self, key: &str) -> RuntimeError {
        let (stage, message) = match self {
            SdkError::DocumentLoad { cause, .. } => (LoadStage::Fetch, cause),
            SdkError::DocumentParse(message) => (LoadStage::Parse, message),
            other => (LoadStage::Validate, other.to_string()),
        };
        RuntimeError::Load {
            key: key.to_string(),
            stage,
            message,
        }
    }

    fn from_runtime(error: RuntimeError, node_id: Option<String>) -> Self {
        match error {
            RuntimeError::Node { node_id, source } => Self::from_runtime(*source, Some(node_id)),
            RuntimeError::Expression { position, message } => SdkError::Expression {
                node_id,
                position,
                message,
            },
            RuntimeError::UnaryExpression(message) => SdkError::UnaryExpression { node_id, message },
            RuntimeError::MissingSubject => SdkError::MissingSubject,
            RuntimeError::InputValidation(message) => SdkError::InputValidation { node_id, message },
            RuntimeError::RecursionLimit { key, limit } => SdkError::RecursionLimit { key, limit },
            RuntimeError::Load {
                key,
                stage,
                message,
            } => match stage {
                LoadStage::Fetch => SdkError::DocumentLoad {
                    key,
                    cause: message,
                },
                LoadStage::Parse => SdkError::DocumentParse(format!("decision '{key}': {message}")),
                LoadStage::Validate => {
                    SdkError::GraphValidation(format!("decision '{key}': {message}"))
                }
            },
            RuntimeError::CustomHandler { node_id, cause } => {
                SdkError::CustomHandler { node_id, cause }
            }
            RuntimeError::NoHandlerConfigured => SdkError::NoHandlerConfigured { node_id },
        }
    }

    pub(crate) fn document_load(key: &str, error: RepositoryError) -> Self {
        SdkError::DocumentLoad {
            key: key.to_string(),
            cause: error.to_string(),
        }
    }
}

impl From<RuntimeError> for SdkError {
    fn from(error: RuntimeError) -> Self {
        Self::from_runtime(error, None)
    }
}

impl From<CompileError> for SdkError {
    fn from(error: CompileError) -> Self {
        match error {
            CompileError::DocumentParse(e) => SdkError::DocumentParse(e.to_string()),
            other => SdkError::GraphValidation(other.to_string()),
        }
    }
}

impl From<RepositoryError> for SdkError {
    fn from(error: RepositoryError) -> Self {
        let key = match &error {
            RepositoryError::NotFound(key)
            | RepositoryError::InvalidKey(key)
            | RepositoryError::Internal { key, .. } => key.clone(),
            RepositoryError::InvalidPath { path } => path.display().to_string(),
        };
        SdkError::DocumentLoad {
            key,
            cause: error.to_string(),
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
