//! Evaluation result and trace types

mod result;
mod trace;

pub use result::DecisionResponse;
pub use trace::NodeTrace;
