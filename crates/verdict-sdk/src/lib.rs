//! Verdict Decision Engine SDK
//!
//! High-level API for loading, compiling and evaluating decision graphs.
//!
//! ```
//! use serde_json::json;
//! use verdict_sdk::{DecisionEngine, Value};
//!
//! let engine = DecisionEngine::new();
//! let decision = engine
//!     .create_decision(
//!         json!({
//!             "nodes": [
//!                 {"id": "in", "type": "inputNode", "name": "Request", "content": {}},
//!                 {"id": "double", "type": "expressionNode", "name": "Double",
//!                  "content": {"expressions": [{"id": "e1", "key": "output", "value": "input * 2"}]}},
//!                 {"id": "out", "type": "outputNode", "name": "Response", "content": {}}
//!             ],
//!             "edges": [
//!                 {"id": "e1", "sourceId": "in", "targetId": "double"},
//!                 {"id": "e2", "sourceId": "double", "targetId": "out"}
//!             ]
//!         })
//!         .to_string(),
//!     )
//!     .unwrap();
//!
//! let response = decision.evaluate(json!({"input": 5})).unwrap();
//! assert_eq!(response.result, Value::from(json!({"output": 10})));
//! ```

pub mod builder;
pub mod config;
pub mod decision_engine;
pub mod error;
pub mod handler;
pub mod standalone;

// Re-export main types
pub use builder::DecisionEngineBuilder;
pub use config::{EngineConfig, EvaluationOptions};
pub use decision_engine::{Decision, DecisionEngine};
pub use error::{Result, SdkError};
pub use handler::{
    BlockingClosureHandler, BlockingCustomNodeHandler, ClosureHandler, CustomNodeHandler,
};
pub use standalone::{evaluate_expression, evaluate_unary_expression, render_template};

// Re-export commonly used types from dependencies
pub use verdict_core::Value;
pub use verdict_repository::{
    BlockingClosureLoader, BlockingDecisionLoader, CacheStats, ClosureLoader, DecisionLoader,
    FilesystemLoader, MemoryLoader, NoopLoader, RepositoryError, RepositoryResult,
};
pub use verdict_runtime::{
    CustomNodeRequest, DecisionResponse, NodeTrace, Scheduling, ZeroDivisionPolicy,
};
