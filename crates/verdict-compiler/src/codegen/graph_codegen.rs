//! Graph compiler
//!
//! Resolves node ids to indexes, wires adjacency lists and fixes the
//! topological order used by every evaluation of the decision.

use super::node_codegen::NodeCompiler;
use crate::error::{CompileError, Result};
use std::collections::{BTreeSet, HashMap};
use verdict_core::ir::{CompiledDecision, CompiledEdge, CompiledNode, CompiledNodeKind};
use verdict_core::model::DecisionDocument;

/// Graph compiler
pub struct GraphCompiler;

impl GraphCompiler {
    /// Compile an analyzed document into an executable graph
    pub fn compile(document: &DecisionDocument) -> Result<CompiledDecision> {
        let index: HashMap<&str, usize> = document
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let mut nodes = document
            .nodes
            .iter()
            .map(|node| {
                Ok(CompiledNode {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    kind: NodeCompiler::compile(node)?,
                    incoming: Vec::new(),
                    outgoing: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut edges = Vec::with_capacity(document.edges.len());
        for edge in &document.edges {
            let resolve = |id: &str| {
                index.get(id).copied().ok_or_else(|| {
                    CompileError::graph(
                        "E006",
                        Some(id),
                        format!("Edge '{}' references non-existent node '{}'", edge.id, id),
                    )
                })
            };
            let source = resolve(&edge.source_node_id)?;
            let target = resolve(&edge.target_node_id)?;

            let edge_index = edges.len();
            nodes[source].outgoing.push(edge_index);
            nodes[target].incoming.push(edge_index);
            edges.push(CompiledEdge {
                id: edge.id.clone(),
                source,
                target,
                source_handle: edge.source_handle.clone(),
            });
        }

        let order = topological_order(&nodes, &edges)?;

        let find = |predicate: fn(&CompiledNodeKind) -> bool, label: &str, code: &'static str| {
            nodes
                .iter()
                .position(|n| predicate(&n.kind))
                .ok_or_else(|| CompileError::graph(code, None, format!("Decision has no {} node", label)))
        };
        let input = find(|k| matches!(k, CompiledNodeKind::Input { .. }), "input", "E002")?;
        let output = find(|k| matches!(k, CompiledNodeKind::Output { .. }), "output", "E003")?;

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "compiled decision graph"
        );

        Ok(CompiledDecision {
            nodes,
            edges,
            order,
            input,
            output,
        })
    }
}

/// Kahn's algorithm; ties are broken by document position so the order is
/// stable for a given document
fn topological_order(nodes: &[CompiledNode], edges: &[CompiledEdge]) -> Result<Vec<usize>> {
    let mut in_degree: Vec<usize> = nodes.iter().map(|n| n.incoming.len()).collect();
    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(i, _)| i)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(current) = ready.pop_first() {
        order.push(current);
        for &edge in &nodes[current].outgoing {
            let target = edges[edge].target;
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                ready.insert(target);
            }
        }
    }

    if order.len() != nodes.len() {
        let stuck = in_degree
            .iter()
            .position(|d| *d > 0)
            .and_then(|i| nodes.get(i))
            .map(|n| n.id.as_str());
        return Err(CompileError::graph("E007", stuck, "Cycle detected in decision graph"));
    }

    Ok(order)
}
