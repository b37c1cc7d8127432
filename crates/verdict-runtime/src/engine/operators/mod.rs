//! Operator execution modules
//!
//! This module contains the implementation of operator evaluation for the
//! expression interpreter.

mod binary;
mod comparison;
mod unary;

pub(crate) use binary::{execute_arithmetic, execute_membership};
pub(crate) use comparison::execute_compare;
pub(crate) use unary::execute_unary_op;
