//! Abstract Syntax Tree (AST) definitions for the verdict expression language

pub mod expression;
pub mod operator;

pub use expression::{Expression, UnaryOperator};
pub use operator::Operator;
