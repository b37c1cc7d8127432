//! Configuration types for DecisionEngine

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use verdict_runtime::{ExecutionOptions, Scheduling, ZeroDivisionPolicy};

/// Main engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Deepest allowed sub-decision nesting
    pub max_depth: usize,

    /// Trace evaluations that do not set `trace` themselves
    pub trace: bool,

    /// Behaviour of division by zero in expressions
    pub zero_division: ZeroDivisionPolicy,

    /// Node scheduling for async evaluations. Blocking evaluations are
    /// always sequential.
    pub scheduling: Scheduling,

    /// Expose earlier node outputs as `$nodes.<name>`
    pub nodes_in_context: bool,

    /// Check input against the input node's schema
    pub validate_input: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            max_depth: 5,
            trace: false,
            zero_division: ZeroDivisionPolicy::Error,
            scheduling: Scheduling::Sequential,
            nodes_in_context: false,
            validate_input: true,
        }
    }

    /// Defaults overridden by `VERDICT_*` environment variables.
    /// Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(depth) = parse_var(&lookup, "VERDICT_MAX_DEPTH") {
            config.max_depth = depth;
        }
        if let Some(Flag(trace)) = parse_var(&lookup, "VERDICT_TRACE") {
            config.trace = trace;
        }
        if let Some(Flag(enabled)) = parse_var(&lookup, "VERDICT_NODES_IN_CONTEXT") {
            config.nodes_in_context = enabled;
        }
        if let Some(raw) = lookup("VERDICT_ZERO_DIVISION") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "error" => config.zero_division = ZeroDivisionPolicy::Error,
                "null" => config.zero_division = ZeroDivisionPolicy::Null,
                _ => tracing::warn!(value = %raw, "ignoring invalid VERDICT_ZERO_DIVISION"),
            }
        }
        if let Some(raw) = lookup("VERDICT_SCHEDULING") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "sequential" => config.scheduling = Scheduling::Sequential,
                "concurrent" => config.scheduling = Scheduling::Concurrent,
                _ => tracing::warn!(value = %raw, "ignoring invalid VERDICT_SCHEDULING"),
            }
        }

        config
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_zero_division(mut self, policy: ZeroDivisionPolicy) -> Self {
        self.zero_division = policy;
        self
    }

    pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
        self.scheduling = scheduling;
        self
    }

    pub fn with_nodes_in_context(mut self, enabled: bool) -> Self {
        self.nodes_in_context = enabled;
        self
    }

    pub fn with_validate_input(mut self, enabled: bool) -> Self {
        self.validate_input = enabled;
        self
    }

    /// Executor options for one evaluation
    pub(crate) fn execution_options(&self, options: &EvaluationOptions, blocking: bool) -> ExecutionOptions {
        ExecutionOptions {
            trace: options.trace.unwrap_or(self.trace),
            max_depth: options.max_depth.unwrap_or(self.max_depth),
            zero_division: self.zero_division,
            scheduling: if blocking {
                Scheduling::Sequential
            } else {
                self.scheduling
            },
            nodes_in_context: self.nodes_in_context,
            validate_input: self.validate_input,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call overrides of the engine configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOptions {
    /// Record per-node trace entries
    #[serde(default)]
    pub trace: Option<bool>,

    /// Deepest allowed sub-decision nesting
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl EvaluationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Boolean environment flag accepting `1/0`, `true/false`, `yes/no`, `on/off`
struct Flag(bool);

impl FromStr for Flag {
    type Err = ();

    fn from_str(raw: &str) -> std::result::Result<Self, ()> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Flag(true)),
            "0" | "false" | "no" | "off" => Ok(Flag(false)),
            _ => Err(()),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring invalid environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, 5);
        assert!(!config.trace);
        assert!(config.validate_input);
        assert_eq!(config.scheduling, Scheduling::Sequential);
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("VERDICT_MAX_DEPTH", "12"),
            ("VERDICT_TRACE", "yes"),
            ("VERDICT_ZERO_DIVISION", "NULL"),
            ("VERDICT_SCHEDULING", "concurrent"),
            ("VERDICT_NODES_IN_CONTEXT", "1"),
        ]));

        assert_eq!(
            config,
            EngineConfig::new()
                .with_max_depth(12)
                .with_trace(true)
                .with_zero_division(ZeroDivisionPolicy::Null)
                .with_scheduling(Scheduling::Concurrent)
                .with_nodes_in_context(true)
        );
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("VERDICT_MAX_DEPTH", "deep"),
            ("VERDICT_TRACE", "maybe"),
            ("VERDICT_SCHEDULING", "parallel"),
        ]));
        assert_eq!(config, EngineConfig::new());
    }

    #[test]
    fn test_evaluation_options_override_config() {
        let config = EngineConfig::new()
            .with_trace(true)
            .with_scheduling(Scheduling::Concurrent);

        let defaults = config.execution_options(&EvaluationOptions::new(), false);
        assert!(defaults.trace);
        assert_eq!(defaults.scheduling, Scheduling::Concurrent);

        let overridden = config.execution_options(
            &EvaluationOptions::new().with_trace(false).with_max_depth(2),
            true,
        );
        assert!(!overridden.trace);
        assert_eq!(overridden.max_depth, 2);
        assert_eq!(overridden.scheduling, Scheduling::Sequential);
    }

    #[test]
    fn test_evaluation_options_from_json() {
        let options: EvaluationOptions =
            serde_json::from_value(serde_json::json!({"trace": true, "maxDepth": 3})).unwrap();
        assert_eq!(options, EvaluationOptions::new().with_trace(true).with_max_depth(3));
    }
}
