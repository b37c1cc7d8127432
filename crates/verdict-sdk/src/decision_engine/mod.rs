//! DecisionEngine - Main API for evaluating decisions
//!
//! # Architecture
//!
//! The module is organized into:
//! - `engine`: the engine, its shared state and the compiled-decision cache
//! - `decision`: handle to one compiled decision
//! - `host`: async and blocking implementations of the runtime host capability

mod decision;
pub(crate) mod engine;
mod host;

pub use decision::Decision;
pub use engine::DecisionEngine;
