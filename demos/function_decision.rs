//! Function-style decision example
//!
//! This example demonstrates:
//! - Registering a decision document with an in-memory loader
//! - Blocking evaluation by key
//! - Reading the per-node trace

use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verdict_sdk::{DecisionEngine, EvaluationOptions, MemoryLoader};

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verdict_sdk=info,verdict_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    println!("=== Function Decision Example ===\n");

    let loader = MemoryLoader::new();
    loader.insert_json(
        "pricing/double.json",
        &json!({
            "nodes": [
                {"id": "in", "name": "Request", "type": "inputNode"},
                {
                    "id": "double",
                    "name": "Double",
                    "type": "expressionNode",
                    "content": {
                        "expressions": [
                            {"id": "x1", "key": "output", "value": "input * 2"},
                            {"id": "x2", "key": "label", "value": "$.output > 20 ? 'high' : 'low'"}
                        ]
                    }
                },
                {"id": "out", "name": "Response", "type": "outputNode"}
            ],
            "edges": [
                {"id": "e1", "sourceId": "in", "targetId": "double"},
                {"id": "e2", "sourceId": "double", "targetId": "out"}
            ]
        }),
    );

    let engine = DecisionEngine::builder().with_loader(loader).build();

    for input in [5, 15] {
        let response = engine.evaluate("pricing/double.json", json!({ "input": input }))?;
        println!("input = {:>2}  ->  {}", input, response.result);
    }

    let traced = engine.evaluate_with(
        "pricing/double.json",
        json!({"input": 7}),
        EvaluationOptions::new().with_trace(true),
    )?;

    println!("\nTrace:");
    for node in traced.trace.unwrap_or_default() {
        println!("  {:<8} {:<16} {:>10}  {}", node.id, node.kind, node.performance, node.output);
    }
    println!("\nTotal time: {}", traced.performance);

    let stats = engine.cache_stats();
    println!("Cache: {} hits, {} misses, {} compilations", stats.hits, stats.misses, stats.compilations);

    Ok(())
}
