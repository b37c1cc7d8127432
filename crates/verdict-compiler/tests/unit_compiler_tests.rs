//! Unit tests for the compiler entry point
//!
//! Covers document parse failures, graph validation failures and the shape
//! of the compiled IR for each node kind.

use serde_json::json;
use verdict_compiler::{CompileError, Compiler};
use verdict_core::ir::CompiledNodeKind;
use verdict_core::model::{HitPolicy, SwitchHitPolicy};

fn compile(value: serde_json::Value) -> Result<verdict_core::CompiledDecision, CompileError> {
    Compiler::new().compile(&serde_json::to_vec(&value).unwrap())
}

fn table_document() -> serde_json::Value {
    json!({
        "nodes": [
            {"id": "in", "name": "Request", "type": "inputNode"},
            {
                "id": "table",
                "name": "Fees",
                "type": "decisionTableNode",
                "content": {
                    "hitPolicy": "first",
                    "inputs": [{"id": "c1", "name": "Input", "field": "input"}],
                    "outputs": [{"id": "o1", "name": "Output", "field": "output"}],
                    "rules": [
                        {"_id": "r1", "c1": "< 10", "o1": "0"},
                        {"_id": "r2", "c1": ">= 10", "o1": "10"}
                    ]
                }
            },
            {"id": "out", "name": "Response", "type": "outputNode"}
        ],
        "edges": [
            {"id": "e1", "sourceId": "in", "targetId": "table"},
            {"id": "e2", "sourceId": "table", "targetId": "out"}
        ]
    })
}

// =============================================================================
// Successful Compilation
// =============================================================================

#[test]
fn test_compile_table_document() {
    let decision = compile(table_document()).expect("table document should compile");

    assert_eq!(decision.nodes.len(), 3);
    assert_eq!(decision.order, vec![0, 1, 2]);
    assert_eq!(decision.nodes[decision.input].id, "in");
    assert_eq!(decision.nodes[decision.output].id, "out");

    let CompiledNodeKind::DecisionTable { table, .. } = &decision.nodes[1].kind else {
        panic!("expected decision table");
    };
    assert_eq!(table.hit_policy, HitPolicy::First);
    assert_eq!(table.rules.len(), 2);
    assert_eq!(table.rules[1].id.as_deref(), Some("r2"));
    assert_eq!(table.rules[0].conditions[0].as_ref().unwrap().source, "< 10");
}

#[test]
fn test_compile_is_deterministic() {
    let first = compile(table_document()).unwrap();
    let second = compile(table_document()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_compile_switch_and_custom_nodes() {
    let decision = compile(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {
                "id": "sw", "type": "switchNode",
                "content": {
                    "hitPolicy": "collect",
                    "statements": [{"id": "big", "condition": "amount > 100"}, {"id": "else", "condition": ""}]
                }
            },
            {
                "id": "fx", "type": "customNode",
                "content": {"kind": "fx-rate", "config": {"currency": "{{ currency }}"}, "nonFatal": true}
            },
            {"id": "out", "type": "outputNode"}
        ],
        "edges": [
            {"id": "e1", "sourceId": "in", "targetId": "sw"},
            {"id": "e2", "sourceId": "sw", "targetId": "fx", "sourceHandle": "big"},
            {"id": "e3", "sourceId": "sw", "targetId": "out", "sourceHandle": "else"},
            {"id": "e4", "sourceId": "fx", "targetId": "out"}
        ]
    }))
    .unwrap();

    let switch = decision.node_by_id("sw").unwrap();
    let CompiledNodeKind::Switch { hit_policy, statements } = &switch.kind else {
        panic!("expected switch");
    };
    assert_eq!(*hit_policy, SwitchHitPolicy::Collect);
    assert!(statements[1].condition.is_none());
    assert_eq!(switch.outgoing.len(), 2);

    let custom = decision.node_by_id("fx").unwrap();
    let CompiledNodeKind::Custom { kind, non_fatal, config, .. } = &custom.kind else {
        panic!("expected custom node");
    };
    assert_eq!(kind, "fx-rate");
    assert!(*non_fatal);
    assert_eq!(config.dot("currency").and_then(|v| v.as_str()), Some("{{ currency }}"));
}

#[test]
fn test_compile_input_schema() {
    let decision = compile(json!({
        "nodes": [
            {
                "id": "in", "type": "inputNode",
                "content": {"schema": "{\"type\":\"object\",\"required\":[\"age\"],\"properties\":{\"age\":{\"type\":\"integer\"}}}"}
            },
            {"id": "out", "type": "outputNode"}
        ],
        "edges": [{"id": "e1", "sourceId": "in", "targetId": "out"}]
    }))
    .unwrap();

    let CompiledNodeKind::Input { schema: Some(schema), advisory } = &decision.nodes[0].kind else {
        panic!("expected input schema");
    };
    assert!(!advisory);
    assert!(schema.is_required("age"));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_malformed_document_is_a_parse_error() {
    let err = Compiler::new().compile(b"[1, 2").unwrap_err();
    assert!(matches!(err, CompileError::DocumentParse(_)));
    assert_eq!(err.code(), None);
}

#[test]
fn test_unknown_node_type_is_a_parse_error() {
    let err = compile(json!({
        "nodes": [{"id": "f", "type": "functionNode", "content": {"source": ""}}],
        "edges": []
    }))
    .unwrap_err();
    assert!(matches!(err, CompileError::DocumentParse(_)));
}

#[test]
fn test_missing_output_node() {
    let err = compile(json!({
        "nodes": [{"id": "in", "type": "inputNode"}],
        "edges": []
    }))
    .unwrap_err();
    assert!(matches!(err, CompileError::GraphValidation { code: "E003", .. }));
}

#[test]
fn test_expression_syntax_error_names_node() {
    let err = compile(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {
                "id": "calc", "type": "expressionNode",
                "content": {"expressions": [{"id": "1", "key": "x", "value": "input * * 2"}]}
            },
            {"id": "out", "type": "outputNode"}
        ],
        "edges": [
            {"id": "e1", "sourceId": "in", "targetId": "calc"},
            {"id": "e2", "sourceId": "calc", "targetId": "out"}
        ]
    }))
    .unwrap_err();

    assert!(matches!(err, CompileError::InvalidExpression { .. }));
    assert_eq!(err.node_id(), Some("calc"));
}

#[test]
fn test_invalid_schema() {
    let err = compile(json!({
        "nodes": [
            {"id": "in", "type": "inputNode", "content": {"schema": {"type": "string"}}},
            {"id": "out", "type": "outputNode"}
        ],
        "edges": [{"id": "e1", "sourceId": "in", "targetId": "out"}]
    }))
    .unwrap_err();
    assert_eq!(err.code(), Some("E012"));
    assert_eq!(err.node_id(), Some("in"));
}

#[test]
fn test_empty_decision_key() {
    let err = compile(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "sub", "type": "decisionNode", "content": {"key": "  "}},
            {"id": "out", "type": "outputNode"}
        ],
        "edges": [
            {"id": "e1", "sourceId": "in", "targetId": "sub"},
            {"id": "e2", "sourceId": "sub", "targetId": "out"}
        ]
    }))
    .unwrap_err();
    assert_eq!(err.code(), Some("E011"));
}

#[test]
fn test_unreachable_nodes_still_compile() {
    let document = json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "orphan", "type": "expressionNode", "content": {"expressions": []}},
            {"id": "out", "type": "outputNode"}
        ],
        "edges": [{"id": "e1", "sourceId": "in", "targetId": "out"}]
    });

    let compiler = Compiler::new();
    let parsed = serde_json::from_value(document.clone()).unwrap();
    let warnings = compiler.analyze(&parsed).unwrap();
    assert_eq!(warnings.len(), 1);

    let decision = compile(document).unwrap();
    assert!(decision.node_by_id("orphan").unwrap().incoming.is_empty());
}
