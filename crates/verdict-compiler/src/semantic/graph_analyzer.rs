//! Decision graph semantic analyzer
//!
//! Structural validation run before code generation:
//!
//! | code | rule                                                      |
//! |------|-----------------------------------------------------------|
//! | E001 | node ids are unique                                       |
//! | E002 | exactly one input node                                    |
//! | E003 | exactly one output node                                   |
//! | E004 | the input node has no incoming edges                      |
//! | E005 | the output node has no outgoing edges                     |
//! | E006 | edges reference existing nodes                            |
//! | E007 | the graph is acyclic                                      |
//! | E008 | table rule cells reference declared columns               |
//! | E009 | switch edge handles reference declared statements         |
//! | E011 | decision nodes name a key                                 |
//! | W001 | node is not reachable from the input node                 |

use crate::error::{CompileError, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use verdict_core::model::{DecisionDocument, DecisionNode, NodeKind};

/// Warning diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub code: String,
    pub node_id: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct AnalysisResult {
    errors: Vec<CompileError>,
    warnings: Vec<Warning>,
}

impl AnalysisResult {
    fn add_error(&mut self, code: &'static str, node_id: Option<&str>, message: String) {
        self.errors.push(CompileError::graph(code, node_id, message));
    }

    fn add_warning(&mut self, code: &str, node_id: &str, message: String) {
        self.warnings.push(Warning {
            code: code.to_string(),
            node_id: node_id.to_string(),
            message,
        });
    }

    fn into_result(self) -> Result<Vec<Warning>> {
        match self.errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(self.warnings),
        }
    }
}

/// Graph analyzer
pub struct GraphAnalyzer;

impl GraphAnalyzer {
    /// Validate a document, returning warnings or the first error found
    pub fn analyze(document: &DecisionDocument) -> Result<Vec<Warning>> {
        let mut result = AnalysisResult::default();

        let mut node_map: HashMap<&str, &DecisionNode> = HashMap::new();
        for node in &document.nodes {
            if node_map.insert(node.id.as_str(), node).is_some() {
                result.add_error("E001", Some(node.id.as_str()), format!("Duplicate node id '{}'", node.id));
            }
        }

        let input = single_node_of_kind(document, "E002", "input", &mut result, |k| {
            matches!(k, NodeKind::Input(_))
        });
        let output = single_node_of_kind(document, "E003", "output", &mut result, |k| {
            matches!(k, NodeKind::Output(_))
        });

        for edge in &document.edges {
            for endpoint in [&edge.source_node_id, &edge.target_node_id] {
                if !node_map.contains_key(endpoint.as_str()) {
                    result.add_error(
                        "E006",
                        Some(endpoint.as_str()),
                        format!("Edge '{}' references non-existent node '{}'", edge.id, endpoint),
                    );
                }
            }

            if input.is_some_and(|id| id == edge.target_node_id) {
                result.add_error(
                    "E004",
                    Some(edge.target_node_id.as_str()),
                    format!("Input node '{}' cannot have incoming edge '{}'", edge.target_node_id, edge.id),
                );
            }
            if output.is_some_and(|id| id == edge.source_node_id) {
                result.add_error(
                    "E005",
                    Some(edge.source_node_id.as_str()),
                    format!("Output node '{}' cannot have outgoing edge '{}'", edge.source_node_id, edge.id),
                );
            }

            if let (Some(handle), Some(source)) = (
                edge.source_handle.as_deref(),
                node_map.get(edge.source_node_id.as_str()),
            ) {
                if let NodeKind::Switch(switch) = &source.kind {
                    if !switch.statements.iter().any(|s| s.id == handle) {
                        result.add_error(
                            "E009",
                            Some(source.id.as_str()),
                            format!(
                                "Edge '{}' uses handle '{}' which is not a statement of switch '{}'",
                                edge.id, handle, source.id
                            ),
                        );
                    }
                }
            }
        }

        for node in &document.nodes {
            validate_node(node, &mut result);
        }

        let adjacency = adjacency(document, &node_map);
        if let Err(e) = check_cycles(document, &adjacency) {
            result.errors.push(e);
        }

        if let Some(input) = input {
            let reachable = find_reachable(input, &adjacency);
            for node in &document.nodes {
                if !reachable.contains(node.id.as_str()) {
                    tracing::warn!(node_id = %node.id, "node is not reachable from the input node");
                    result.add_warning(
                        "W001",
                        &node.id,
                        format!("Unreachable node '{}' (not connected to the input node)", node.id),
                    );
                }
            }
        }

        result.into_result()
    }
}

fn single_node_of_kind<'a>(
    document: &'a DecisionDocument,
    code: &'static str,
    label: &str,
    result: &mut AnalysisResult,
    predicate: impl Fn(&NodeKind) -> bool,
) -> Option<&'a str> {
    let matching: Vec<&DecisionNode> = document.nodes.iter().filter(|n| predicate(&n.kind)).collect();
    match matching.as_slice() {
        [node] => Some(node.id.as_str()),
        [] => {
            result.add_error(code, None, format!("Decision has no {} node", label));
            None
        }
        [_, extra, ..] => {
            result.add_error(
                code,
                Some(extra.id.as_str()),
                format!("Decision has {} {} nodes, expected exactly one", matching.len(), label),
            );
            None
        }
    }
}

/// Kind-specific configuration checks
fn validate_node(node: &DecisionNode, result: &mut AnalysisResult) {
    match &node.kind {
        NodeKind::DecisionTable(table) => {
            let declared: HashSet<&str> = table
                .inputs
                .iter()
                .map(|c| c.id.as_str())
                .chain(table.outputs.iter().map(|c| c.id.as_str()))
                .collect();

            for (index, rule) in table.rules.iter().enumerate() {
                // `_id`, `_description` and other `_` keys are row metadata
                for column in rule.keys().filter(|k| !k.starts_with('_')) {
                    if !declared.contains(column.as_str()) {
                        result.add_error(
                            "E008",
                            Some(node.id.as_str()),
                            format!(
                                "Rule {} of table '{}' references undeclared column '{}'",
                                index, node.id, column
                            ),
                        );
                    }
                }
            }
        }
        NodeKind::Decision(decision) if decision.key.trim().is_empty() => {
            result.add_error(
                "E011",
                Some(node.id.as_str()),
                format!("Decision node '{}' has an empty key", node.id),
            );
        }
        _ => {}
    }
}

fn adjacency<'a>(
    document: &'a DecisionDocument,
    node_map: &HashMap<&str, &DecisionNode>,
) -> HashMap<&'a str, Vec<&'a str>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &document.edges {
        if node_map.contains_key(edge.source_node_id.as_str())
            && node_map.contains_key(edge.target_node_id.as_str())
        {
            adjacency
                .entry(edge.source_node_id.as_str())
                .or_default()
                .push(edge.target_node_id.as_str());
        }
    }
    adjacency
}

/// E007: depth-first search with a recursion stack
fn check_cycles(document: &DecisionDocument, adjacency: &HashMap<&str, Vec<&str>>) -> Result<()> {
    fn dfs<'a>(
        node_id: &'a str,
        adjacency: &HashMap<&'a str, Vec<&'a str>>,
        visited: &mut HashSet<&'a str>,
        rec_stack: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Result<()> {
        visited.insert(node_id);
        rec_stack.insert(node_id);
        path.push(node_id);

        for &next in adjacency.get(node_id).into_iter().flatten() {
            if rec_stack.contains(next) {
                return Err(CompileError::graph(
                    "E007",
                    Some(next),
                    format!(
                        "Cycle detected: {} -> {} (path: {})",
                        node_id,
                        next,
                        path.join(" -> ")
                    ),
                ));
            }
            if !visited.contains(next) {
                dfs(next, adjacency, visited, rec_stack, path)?;
            }
        }

        path.pop();
        rec_stack.remove(node_id);
        Ok(())
    }

    let mut visited = HashSet::new();
    for node in &document.nodes {
        if !visited.contains(node.id.as_str()) {
            let mut rec_stack = HashSet::new();
            let mut path = Vec::new();
            dfs(&node.id, adjacency, &mut visited, &mut rec_stack, &mut path)?;
        }
    }
    Ok(())
}

/// W001: breadth-first search from the input node
fn find_reachable<'a>(input: &'a str, adjacency: &HashMap<&'a str, Vec<&'a str>>) -> HashSet<&'a str> {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::from([input]);

    while let Some(node_id) = queue.pop_front() {
        if !reachable.insert(node_id) {
            continue;
        }
        for &next in adjacency.get(node_id).into_iter().flatten() {
            if !reachable.contains(next) {
                queue.push_back(next);
            }
        }
    }

    reachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> DecisionDocument {
        serde_json::from_value(value).unwrap()
    }

    fn node(id: &str, kind: &str) -> serde_json::Value {
        json!({"id": id, "name": id, "type": kind, "content": {}})
    }

    fn edge(id: &str, from: &str, to: &str) -> serde_json::Value {
        json!({"id": id, "sourceId": from, "targetId": to})
    }

    fn code_of(err: CompileError) -> &'static str {
        err.code().unwrap_or("none")
    }

    #[test]
    fn test_valid_graph_has_no_warnings() {
        let doc = document(json!({
            "nodes": [node("in", "inputNode"), node("out", "outputNode")],
            "edges": [edge("e1", "in", "out")]
        }));
        assert_eq!(GraphAnalyzer::analyze(&doc).unwrap(), vec![]);
    }

    #[test]
    fn test_duplicate_ids() {
        let doc = document(json!({
            "nodes": [node("in", "inputNode"), node("in", "outputNode")],
            "edges": []
        }));
        assert_eq!(code_of(GraphAnalyzer::analyze(&doc).unwrap_err()), "E001");
    }

    #[test]
    fn test_missing_and_duplicate_endpoints() {
        let no_input = document(json!({"nodes": [node("out", "outputNode")], "edges": []}));
        assert_eq!(code_of(GraphAnalyzer::analyze(&no_input).unwrap_err()), "E002");

        let two_outputs = document(json!({
            "nodes": [node("in", "inputNode"), node("a", "outputNode"), node("b", "outputNode")],
            "edges": []
        }));
        let err = GraphAnalyzer::analyze(&two_outputs).unwrap_err();
        assert_eq!(code_of(err.clone()), "E003");
        assert_eq!(err.node_id(), Some("b"));
    }

    #[test]
    fn test_edge_direction_rules() {
        let doc = document(json!({
            "nodes": [node("in", "inputNode"), node("x", "expressionNode"), node("out", "outputNode")],
            "edges": [edge("e1", "x", "in"), edge("e2", "in", "out")]
        }));
        assert_eq!(code_of(GraphAnalyzer::analyze(&doc).unwrap_err()), "E004");

        let doc = document(json!({
            "nodes": [node("in", "inputNode"), node("x", "expressionNode"), node("out", "outputNode")],
            "edges": [edge("e1", "in", "out"), edge("e2", "out", "x")]
        }));
        assert_eq!(code_of(GraphAnalyzer::analyze(&doc).unwrap_err()), "E005");
    }

    #[test]
    fn test_dangling_edge() {
        let doc = document(json!({
            "nodes": [node("in", "inputNode"), node("out", "outputNode")],
            "edges": [edge("e1", "in", "ghost"), edge("e2", "in", "out")]
        }));
        let err = GraphAnalyzer::analyze(&doc).unwrap_err();
        assert_eq!(code_of(err.clone()), "E006");
        assert_eq!(err.node_id(), Some("ghost"));
    }

    #[test]
    fn test_cycle_detection() {
        let doc = document(json!({
            "nodes": [
                node("in", "inputNode"),
                node("a", "expressionNode"),
                node("b", "expressionNode"),
                node("out", "outputNode")
            ],
            "edges": [
                edge("e1", "in", "a"),
                edge("e2", "a", "b"),
                edge("e3", "b", "a"),
                edge("e4", "b", "out")
            ]
        }));
        let err = GraphAnalyzer::analyze(&doc).unwrap_err();
        assert_eq!(code_of(err.clone()), "E007");
        assert!(err.to_string().contains("Cycle detected"));
    }

    #[test]
    fn test_table_rule_with_undeclared_column() {
        let doc = document(json!({
            "nodes": [
                node("in", "inputNode"),
                {
                    "id": "t", "name": "t", "type": "decisionTableNode",
                    "content": {
                        "inputs": [{"id": "c1", "field": "a"}],
                        "outputs": [{"id": "o1", "field": "b"}],
                        "rules": [{"_id": "r1", "c1": "1", "o1": "2", "c9": "3"}]
                    }
                },
                node("out", "outputNode")
            ],
            "edges": [edge("e1", "in", "t"), edge("e2", "t", "out")]
        }));
        let err = GraphAnalyzer::analyze(&doc).unwrap_err();
        assert_eq!(code_of(err.clone()), "E008");
        assert!(err.to_string().contains("c9"));
    }

    #[test]
    fn test_switch_handle_must_exist() {
        let doc = document(json!({
            "nodes": [
                node("in", "inputNode"),
                {
                    "id": "sw", "name": "sw", "type": "switchNode",
                    "content": {"statements": [{"id": "s1", "condition": "a > 1"}]}
                },
                node("out", "outputNode")
            ],
            "edges": [
                edge("e1", "in", "sw"),
                {"id": "e2", "sourceId": "sw", "targetId": "out", "sourceHandle": "s2"}
            ]
        }));
        assert_eq!(code_of(GraphAnalyzer::analyze(&doc).unwrap_err()), "E009");
    }

    #[test]
    fn test_unreachable_node_is_a_warning() {
        let doc = document(json!({
            "nodes": [node("in", "inputNode"), node("lonely", "expressionNode"), node("out", "outputNode")],
            "edges": [edge("e1", "in", "out")]
        }));
        let warnings = GraphAnalyzer::analyze(&doc).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "W001");
        assert_eq!(warnings[0].node_id, "lonely");
    }
}
