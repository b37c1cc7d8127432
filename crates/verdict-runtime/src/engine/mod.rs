//! Expression engine
//!
//! Interpreter, built-in functions and operator semantics.

mod dates;
mod functions;
pub mod interpreter;
mod operators;

pub use interpreter::{Interpreter, Scope};
