//! Shared document builders for SDK integration tests

#![allow(dead_code)]

use serde_json::{json, Value as Json};
use verdict_sdk::MemoryLoader;

/// input -> <middle> -> output
pub fn linear(middle: Json) -> Json {
    let id = middle["id"].clone();
    json!({
        "nodes": [
            {"id": "in", "name": "Request", "type": "inputNode"},
            middle,
            {"id": "out", "name": "Response", "type": "outputNode"}
        ],
        "edges": [
            {"id": "e1", "sourceId": "in", "targetId": id},
            {"id": "e2", "sourceId": id, "targetId": "out"}
        ]
    })
}

pub fn expression_node(id: &str, expressions: &[(&str, &str)]) -> Json {
    let expressions: Vec<_> = expressions
        .iter()
        .enumerate()
        .map(|(i, (key, value))| json!({"id": format!("x{i}"), "key": key, "value": value}))
        .collect();
    json!({"id": id, "name": id, "type": "expressionNode", "content": {"expressions": expressions}})
}

/// Single expression node doubling `input`
pub fn function_document() -> Json {
    linear(expression_node("double", &[("output", "input * 2")]))
}

/// First-hit table with rows `input < 10 -> 0`, `input >= 10 -> 10`
pub fn table_document() -> Json {
    table_with_rules(vec![
        json!({"_id": "r1", "c1": "< 10", "o1": "0"}),
        json!({"_id": "r2", "c1": ">= 10", "o1": "10"}),
    ])
}

pub fn table_with_rules(rules: Vec<Json>) -> Json {
    linear(json!({
        "id": "fees",
        "name": "Fees",
        "type": "decisionTableNode",
        "content": {
            "hitPolicy": "first",
            "inputs": [{"id": "c1", "name": "Input", "field": "input"}],
            "outputs": [{"id": "o1", "name": "Output", "field": "output"}],
            "rules": rules
        }
    }))
}

/// Custom node next to an expression node, both feeding the output
pub fn custom_document(non_fatal: bool) -> Json {
    json!({
        "nodes": [
            {"id": "in", "name": "Request", "type": "inputNode"},
            {
                "id": "fx",
                "name": "Rates",
                "type": "customNode",
                "content": {
                    "kind": "fx-rate",
                    "config": {"currency": "{{ currency }}"},
                    "nonFatal": non_fatal
                }
            },
            expression_node("base", &[("base", "amount")]),
            {"id": "out", "name": "Response", "type": "outputNode"}
        ],
        "edges": [
            {"id": "e1", "sourceId": "in", "targetId": "fx"},
            {"id": "e2", "sourceId": "in", "targetId": "base"},
            {"id": "e3", "sourceId": "fx", "targetId": "out"},
            {"id": "e4", "sourceId": "base", "targetId": "out"}
        ]
    })
}

/// Decision node delegating to `key`
pub fn sub_decision_document(key: &str) -> Json {
    linear(json!({
        "id": "nested",
        "name": "Nested",
        "type": "decisionNode",
        "content": {"key": key}
    }))
}

pub fn bytes(document: &Json) -> Vec<u8> {
    serde_json::to_vec(document).unwrap()
}

/// Loader holding the standard fixtures
pub fn fixture_loader() -> MemoryLoader {
    let loader = MemoryLoader::new();
    loader.insert_json("function.json", &function_document());
    loader.insert_json("table.json", &table_document());
    loader.insert_json("custom.json", &custom_document(false));
    loader.insert_json("custom-non-fatal.json", &custom_document(true));
    loader.insert_json("nested.json", &sub_decision_document("function.json"));
    loader.insert_json("self.json", &sub_decision_document("self.json"));
    loader
}
