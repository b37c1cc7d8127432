//! Parser error types

use thiserror::Error;

/// Parser error. Positions are byte offsets into the parsed source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Document is not valid JSON or does not match the document model
    #[error("Invalid decision document: {0}")]
    InvalidDocument(String),

    #[error("Empty expression")]
    EmptyExpression,

    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("Unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("Unexpected token '{found}' at position {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        position: usize,
    },

    #[error("Unexpected end of expression at position {position}, expected {expected}")]
    UnexpectedEnd { expected: String, position: usize },

    #[error("Unterminated template placeholder at position {position}")]
    UnterminatedPlaceholder { position: usize },
}

impl ParseError {
    /// Byte offset the error points at, when it has one
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::InvalidDocument(_) => None,
            ParseError::EmptyExpression => Some(0),
            ParseError::UnexpectedCharacter { position, .. }
            | ParseError::UnterminatedString { position }
            | ParseError::InvalidNumber { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEnd { position, .. }
            | ParseError::UnterminatedPlaceholder { position } => Some(*position),
        }
    }

    /// Shift the reported position, for sources embedded in a larger text
    pub fn offset(self, by: usize) -> Self {
        match self {
            ParseError::UnexpectedCharacter { character, position } => {
                ParseError::UnexpectedCharacter {
                    character,
                    position: position + by,
                }
            }
            ParseError::UnterminatedString { position } => ParseError::UnterminatedString {
                position: position + by,
            },
            ParseError::InvalidNumber { text, position } => ParseError::InvalidNumber {
                text,
                position: position + by,
            },
            ParseError::UnexpectedToken {
                found,
                expected,
                position,
            } => ParseError::UnexpectedToken {
                found,
                expected,
                position: position + by,
            },
            ParseError::UnexpectedEnd { expected, position } => ParseError::UnexpectedEnd {
                expected,
                position: position + by,
            },
            ParseError::UnterminatedPlaceholder { position } => {
                ParseError::UnterminatedPlaceholder {
                    position: position + by,
                }
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::InvalidDocument(err.to_string())
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
