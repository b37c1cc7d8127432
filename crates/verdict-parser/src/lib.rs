//! Verdict Parser - source text to AST
//!
//! This crate turns the textual parts of a decision into typed structures:
//! decision documents (JSON), standard expressions, unary expressions used
//! by table cells, and `{{ }}` string templates.

pub mod document_parser;
pub mod error;
pub mod expression_parser;
pub mod lexer;
pub mod template_parser;
pub mod unary_parser;

// Re-export main parser types
pub use document_parser::DocumentParser;
pub use error::{ParseError, Result};
pub use expression_parser::ExpressionParser;
pub use template_parser::{Template, TemplateParser, TemplateSegment};
pub use unary_parser::{UnaryParser, SUBJECT};
