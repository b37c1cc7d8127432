//! Decision graph executor
//!
//! Walks a compiled decision in waves. In sequential scheduling every wave
//! is a single node in topological order; in concurrent scheduling a wave is
//! every node of one topological level, run together and applied in
//! topological order so merges stay deterministic.

use crate::config::{ExecutionOptions, Scheduling};
use crate::engine::Interpreter;
use crate::error::{Result, RuntimeError};
use crate::host::{CustomNodeRequest, DecisionHost};
use crate::nodes::{expression, switch, table, transform, NodeOutput};
use crate::result::{DecisionResponse, NodeTrace};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::time::{Duration, Instant};
use verdict_core::ir::{CompiledDecision, CompiledNode, CompiledNodeKind, CompiledTransform};
use verdict_core::model::ExecutionMode;
use verdict_core::types::{Map, Schema, Validator};
use verdict_core::Value;

/// Executes compiled decisions against a host
pub struct GraphExecutor<'h, H: DecisionHost + ?Sized> {
    host: &'h H,
    options: ExecutionOptions,
    interpreter: Interpreter,
}

/// Outcome of one executed node
struct Executed {
    output: Value,
    trace_data: Value,
    /// Statement ids chosen by a switch node
    selected: Option<Vec<String>>,
    elapsed: Duration,
}

impl Executed {
    fn new(output: Value) -> Self {
        Self {
            output,
            trace_data: Value::Null,
            selected: None,
            elapsed: Duration::ZERO,
        }
    }
}

/// Working state of one graph evaluation
struct GraphState {
    outputs: Vec<Option<Value>>,
    active_edges: Vec<bool>,
    /// Node name to output, when node outputs are exposed as `$nodes`
    nodes: Option<Value>,
    trace: Option<Vec<NodeTrace>>,
}

impl GraphState {
    fn new(decision: &CompiledDecision, options: &ExecutionOptions) -> Self {
        Self {
            outputs: vec![None; decision.nodes.len()],
            active_edges: vec![true; decision.edges.len()],
            nodes: options.nodes_in_context.then(Value::object),
            trace: options.trace.then(Vec::new),
        }
    }

    /// Merged input of a node, or `None` when every incoming edge is inactive
    fn node_input(&self, decision: &CompiledDecision, index: usize, input: &Value) -> Option<Value> {
        if index == decision.input {
            return Some(input.clone());
        }

        let node = &decision.nodes[index];
        if node.incoming.is_empty() {
            tracing::debug!(node = %node.id, "node has no incoming edges, running with empty input");
            return Some(Value::object());
        }

        let mut merged = Value::object();
        let mut reached = false;
        for source in decision.predecessors(index) {
            let active = node
                .incoming
                .iter()
                .any(|&e| decision.edges[e].source == source && self.active_edges[e]);
            if let (true, Some(output)) = (active, &self.outputs[source]) {
                merged.merge(output);
                reached = true;
            }
        }
        reached.then_some(merged)
    }

    fn skip(&mut self, decision: &CompiledDecision, index: usize) {
        let node = &decision.nodes[index];
        tracing::debug!(node = %node.id, "node skipped");
        for &edge in &node.outgoing {
            self.active_edges[edge] = false;
        }
    }

    fn record(&mut self, decision: &CompiledDecision, index: usize, input: Value, executed: Executed) {
        let node = &decision.nodes[index];

        if let Some(selected) = &executed.selected {
            for &edge in &node.outgoing {
                self.active_edges[edge] = decision.edges[edge]
                    .source_handle
                    .as_ref()
                    .is_some_and(|handle| selected.contains(handle));
            }
        }

        if let Some(Value::Object(nodes)) = &mut self.nodes {
            let name = if node.name.is_empty() { &node.id } else { &node.name };
            nodes.insert(name.clone(), executed.output.clone());
        }

        if let Some(trace) = &mut self.trace {
            trace.push(
                NodeTrace::new(&node.id, &node.name, node.kind.type_name())
                    .with_io(input, executed.output.clone())
                    .with_elapsed(executed.elapsed)
                    .with_trace_data(executed.trace_data),
            );
        }

        self.outputs[index] = Some(executed.output);
    }

    fn finish(mut self, decision: &CompiledDecision) -> (Value, Option<Vec<NodeTrace>>) {
        let result = self.outputs[decision.output].take().unwrap_or_else(Value::object);
        (result, self.trace)
    }
}

impl<'h, H: DecisionHost + ?Sized> GraphExecutor<'h, H> {
    pub fn new(host: &'h H, options: ExecutionOptions) -> Self {
        Self {
            host,
            interpreter: Interpreter::new(options.zero_division),
            options,
        }
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Evaluate a decision against an input context
    #[tracing::instrument(skip_all, fields(nodes = decision.nodes.len()))]
    pub async fn evaluate(&self, decision: &CompiledDecision, input: Value) -> Result<DecisionResponse> {
        let started = Instant::now();
        let (result, trace) = self.run(decision, input, 0).await?;

        let mut response = DecisionResponse::new(result);
        response.trace = trace;
        response.performance = format!("{:.1?}", started.elapsed());
        tracing::debug!(performance = %response.performance, "decision evaluated");
        Ok(response)
    }

    fn run<'a>(
        &'a self,
        decision: &'a CompiledDecision,
        input: Value,
        depth: usize,
    ) -> BoxFuture<'a, Result<(Value, Option<Vec<NodeTrace>>)>> {
        async move {
            let mut state = GraphState::new(decision, &self.options);

            for wave in self.waves(decision) {
                let mut pending = Vec::with_capacity(wave.len());
                for index in wave {
                    match state.node_input(decision, index, &input) {
                        Some(node_input) => pending.push((index, node_input)),
                        None => state.skip(decision, index),
                    }
                }

                let nodes = state.nodes.as_ref();
                let results = join_all(
                    pending
                        .iter()
                        .map(|(index, node_input)| self.execute_node(decision, *index, node_input, nodes, depth)),
                )
                .await;

                for ((index, node_input), result) in pending.into_iter().zip(results) {
                    state.record(decision, index, node_input, result?);
                }
            }

            Ok(state.finish(decision))
        }
        .boxed()
    }

    fn waves(&self, decision: &CompiledDecision) -> Vec<Vec<usize>> {
        match self.options.scheduling {
            Scheduling::Sequential => decision.order.iter().map(|&i| vec![i]).collect(),
            Scheduling::Concurrent => {
                let mut level = vec![0usize; decision.nodes.len()];
                let mut waves: Vec<Vec<usize>> = Vec::new();
                for &index in &decision.order {
                    let depth = decision.nodes[index]
                        .incoming
                        .iter()
                        .map(|&e| level[decision.edges[e].source] + 1)
                        .max()
                        .unwrap_or(0);
                    level[index] = depth;
                    if waves.len() <= depth {
                        waves.resize_with(depth + 1, Vec::new);
                    }
                    waves[depth].push(index);
                }
                waves
            }
        }
    }

    async fn execute_node(
        &self,
        decision: &CompiledDecision,
        index: usize,
        input: &Value,
        nodes: Option<&Value>,
        depth: usize,
    ) -> Result<Executed> {
        let node = &decision.nodes[index];
        let started = Instant::now();

        let mut executed = self
            .execute_kind(node, input, nodes, depth)
            .await
            .map_err(|e| e.in_node(&node.id))?;
        executed.elapsed = started.elapsed();

        tracing::debug!(
            node = %node.id,
            kind = node.kind.type_name(),
            elapsed = ?executed.elapsed,
            "node executed"
        );
        Ok(executed)
    }

    async fn execute_kind(
        &self,
        node: &CompiledNode,
        input: &Value,
        nodes: Option<&Value>,
        depth: usize,
    ) -> Result<Executed> {
        match &node.kind {
            CompiledNodeKind::Input { schema, advisory } => {
                if let (true, Some(schema)) = (self.options.validate_input, schema) {
                    if let Err(message) = validate(schema, input) {
                        if !*advisory {
                            return Err(RuntimeError::InputValidation(message));
                        }
                        tracing::warn!(node = %node.id, %message, "input does not match schema");
                    }
                }
                Ok(Executed::new(input.clone()))
            }

            CompiledNodeKind::Output { schema } => {
                if let Some(schema) = schema {
                    validate(schema, input).map_err(RuntimeError::InputValidation)?;
                }
                Ok(Executed::new(input.clone()))
            }

            CompiledNodeKind::Switch { hit_policy, statements } => {
                let selected = switch::select(&self.interpreter, *hit_policy, statements, input, nodes)?;
                let mut data = Map::new();
                data.insert(
                    "statements".to_string(),
                    Value::Array(selected.iter().map(|id| Value::from(id.as_str())).collect()),
                );

                let mut executed = Executed::new(input.clone());
                executed.trace_data = Value::Object(data);
                executed.selected = Some(selected);
                Ok(executed)
            }

            CompiledNodeKind::Expression { transform, .. }
            | CompiledNodeKind::DecisionTable { transform, .. }
            | CompiledNodeKind::Decision { transform, .. }
            | CompiledNodeKind::Custom { transform, .. } => {
                self.execute_transformed(node, transform, input, nodes, depth).await
            }
        }
    }

    async fn execute_transformed(
        &self,
        node: &CompiledNode,
        attributes: &CompiledTransform,
        input: &Value,
        nodes: Option<&Value>,
        depth: usize,
    ) -> Result<Executed> {
        let body_input = transform::select_input(&self.interpreter, attributes, input, nodes)?;

        let body = match attributes.execution_mode {
            ExecutionMode::Single => self.execute_body(node, body_input, nodes, depth).await?,
            ExecutionMode::Loop => {
                let items = transform::loop_items(body_input)?;
                let mut outputs = Vec::with_capacity(items.len());
                let mut traces = Vec::with_capacity(items.len());
                for item in items {
                    let body = self.execute_body(node, item, nodes, depth).await?;
                    outputs.push(body.output);
                    traces.push(body.trace_data);
                }
                NodeOutput::new(Value::Array(outputs), Value::Array(traces))
            }
        };

        let mut executed = Executed::new(transform::shape_output(attributes, input, body.output));
        executed.trace_data = body.trace_data;
        Ok(executed)
    }

    async fn execute_body(
        &self,
        node: &CompiledNode,
        input: Value,
        nodes: Option<&Value>,
        depth: usize,
    ) -> Result<NodeOutput> {
        match &node.kind {
            CompiledNodeKind::Expression { expressions, .. } => {
                expression::evaluate(&self.interpreter, expressions, &input, nodes)
            }
            CompiledNodeKind::DecisionTable { table, .. } => {
                table::evaluate(&self.interpreter, table, &input, nodes)
            }
            CompiledNodeKind::Decision { key, .. } => self.execute_decision(key, input, depth).await,
            CompiledNodeKind::Custom {
                kind,
                config,
                non_fatal,
                ..
            } => self.execute_custom(node, kind, config, *non_fatal, input).await,
            CompiledNodeKind::Input { .. }
            | CompiledNodeKind::Output { .. }
            | CompiledNodeKind::Switch { .. } => Ok(NodeOutput::new(input, Value::Null)),
        }
    }

    #[tracing::instrument(skip(self, key, input), fields(key = %key))]
    async fn execute_decision(&self, key: &str, input: Value, depth: usize) -> Result<NodeOutput> {
        if depth + 1 > self.options.max_depth {
            return Err(RuntimeError::RecursionLimit {
                key: key.to_string(),
                limit: self.options.max_depth,
            });
        }

        let decision = self.host.load(key).await?;
        let (output, trace) = self.run(&decision, input, depth + 1).await?;

        let trace_data = match trace {
            Some(entries) => {
                let mut data = Map::new();
                data.insert(
                    "trace".to_string(),
                    serde_json::to_value(&entries).map(Value::from).unwrap_or_default(),
                );
                Value::Object(data)
            }
            None => Value::Null,
        };
        Ok(NodeOutput::new(output, trace_data))
    }

    #[tracing::instrument(skip_all, fields(node = %node.id, kind = %kind))]
    async fn execute_custom(
        &self,
        node: &CompiledNode,
        kind: &str,
        config: &Value,
        non_fatal: bool,
        input: Value,
    ) -> Result<NodeOutput> {
        let request = CustomNodeRequest::new(&node.id, &node.name, kind, config.clone(), input);

        match self.host.handle(request).await {
            Ok(output) => Ok(NodeOutput::new(output, Value::Null)),
            Err(RuntimeError::CustomHandler { cause, .. }) if non_fatal => {
                tracing::warn!(node = %node.id, error = %cause, "non-fatal custom node failed");
                let mut data = Map::new();
                data.insert("error".to_string(), Value::String(cause));
                Ok(NodeOutput::new(Value::object(), Value::Object(data)))
            }
            Err(e) => Err(e),
        }
    }
}

fn validate(schema: &Schema, value: &Value) -> std::result::Result<(), String> {
    Validator::new().validate(value, schema).map_err(|errors| {
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    })
}
