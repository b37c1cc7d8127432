//! Execution options

/// Behaviour of `/` and `%` when the divisor is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroDivisionPolicy {
    /// Fail the expression
    #[default]
    Error,
    /// Produce `null`
    Null,
}

/// How independent nodes of one evaluation are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduling {
    /// One node at a time, in topological order
    #[default]
    Sequential,
    /// Nodes of the same topological level run concurrently
    Concurrent,
}

/// Options for a single graph evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOptions {
    /// Record per-node trace entries
    pub trace: bool,
    /// Deepest allowed sub-decision nesting
    pub max_depth: usize,
    pub zero_division: ZeroDivisionPolicy,
    pub scheduling: Scheduling,
    /// Expose earlier node outputs as `$nodes.<name>`
    pub nodes_in_context: bool,
    /// Check input against the input node's schema
    pub validate_input: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            trace: false,
            max_depth: 5,
            zero_division: ZeroDivisionPolicy::Error,
            scheduling: Scheduling::Sequential,
            nodes_in_context: false,
            validate_input: true,
        }
    }
}
