//! Async batch example
//!
//! This example demonstrates:
//! - A suspending custom node handler
//! - Many evaluations in flight at once on one engine
//! - Concurrent scheduling of independent nodes within a graph

use futures::future::join_all;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verdict_sdk::{CustomNodeRequest, DecisionEngine, EngineConfig, MemoryLoader, Scheduling, Value};

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

/// Two independent lookups feeding one scoring node
fn document() -> serde_json::Value {
    let lookup = |id: &str, service: &str| {
        json!({
            "id": id,
            "name": id,
            "type": "customNode",
            "content": {"kind": "lookup", "config": {"service": service, "user": "{{ user.id }}"}, "outputPath": id}
        })
    };

    json!({
        "nodes": [
            {"id": "in", "name": "Request", "type": "inputNode"},
            lookup("credit", "credit-bureau"),
            lookup("fraud", "fraud-signals"),
            {
                "id": "score",
                "name": "Score",
                "type": "expressionNode",
                "content": {
                    "expressions": [
                        {"id": "x1", "key": "score", "value": "credit.points - fraud.points"},
                        {"id": "x2", "key": "approved", "value": "$.score >= 600"}
                    ]
                }
            },
            {"id": "out", "name": "Response", "type": "outputNode"}
        ],
        "edges": [
            {"id": "e1", "sourceId": "in", "targetId": "credit"},
            {"id": "e2", "sourceId": "in", "targetId": "fraud"},
            {"id": "e3", "sourceId": "credit", "targetId": "score"},
            {"id": "e4", "sourceId": "fraud", "targetId": "score"},
            {"id": "e5", "sourceId": "score", "targetId": "out"}
        ]
    })
}

async fn lookup(request: CustomNodeRequest) -> anyhow::Result<Value> {
    let service = request.get_field("service")?;
    let user = request.get_field("user")?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let user = user.as_str().unwrap_or_default();
    let points = match service.as_str() {
        Some("credit-bureau") => 500 + 40 * user.len() as i64,
        _ => 10 * user.len() as i64,
    };
    Ok(Value::from(json!({ "points": points })))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    println!("=== Async Batch Example ===\n");

    let loader = MemoryLoader::new();
    loader.insert_json("credit.json", &document());

    let engine = DecisionEngine::builder()
        .with_config(EngineConfig::from_env().with_scheduling(Scheduling::Concurrent))
        .with_loader(loader)
        .with_handler_fn(lookup)
        .build();

    let users = ["ada", "grace", "linus", "margaret", "ken"];
    let started = Instant::now();
    let responses = join_all(users.iter().map(|user| {
        engine.evaluate_async("credit.json", json!({"user": {"id": user}}))
    }))
    .await;

    for (user, response) in users.iter().zip(responses) {
        println!("{:<10} {}", user, response?.result);
    }
    println!(
        "\n{} evaluations with two 200ms lookups each took {:?}",
        users.len(),
        started.elapsed()
    );
    println!("Cache: {:?}", engine.cache_stats());

    Ok(())
}
