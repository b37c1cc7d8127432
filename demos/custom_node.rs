//! Custom node example
//!
//! This example demonstrates:
//! - Implementing `CustomNodeHandler` for a struct
//! - Templated handler configuration via `CustomNodeRequest::get_field`
//! - Fatal and non-fatal handler failures

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verdict_sdk::{
    CustomNodeHandler, CustomNodeRequest, DecisionEngine, EvaluationOptions, MemoryLoader, Value,
};

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

/// Serves exchange rates from a fixed table
struct RateHandler {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl CustomNodeHandler for RateHandler {
    async fn handle(&self, request: CustomNodeRequest) -> anyhow::Result<Value> {
        anyhow::ensure!(request.kind == "fx-rate", "unsupported custom node kind '{}'", request.kind);

        let currency = request.get_field("currency")?;
        let currency = currency
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("currency must be a string"))?;
        let rate = self
            .rates
            .get(currency)
            .ok_or_else(|| anyhow::anyhow!("no rate for {currency}"))?;

        Ok(Value::from(json!({ "rate": rate })))
    }
}

fn document(non_fatal: bool) -> serde_json::Value {
    json!({
        "nodes": [
            {"id": "in", "name": "Request", "type": "inputNode"},
            {
                "id": "fx",
                "name": "Exchange rate",
                "type": "customNode",
                "content": {
                    "kind": "fx-rate",
                    "config": {"currency": "{{ order.currency }}"},
                    "nonFatal": non_fatal,
                    "outputPath": "fx"
                }
            },
            {
                "id": "convert",
                "name": "Convert",
                "type": "expressionNode",
                "content": {
                    "expressions": [
                        {"id": "x1", "key": "usd", "value": "round(order.amount * (fx.rate ?? 1) * 100) / 100"}
                    ],
                    "passThrough": true
                }
            },
            {"id": "out", "name": "Response", "type": "outputNode"}
        ],
        "edges": [
            {"id": "e1", "sourceId": "in", "targetId": "fx"},
            {"id": "e2", "sourceId": "fx", "targetId": "convert"},
            {"id": "e3", "sourceId": "convert", "targetId": "out"}
        ]
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    println!("=== Custom Node Example ===\n");

    let loader = MemoryLoader::new();
    loader.insert_json("convert.json", &document(false));
    loader.insert_json("convert-lenient.json", &document(true));

    let handler = RateHandler {
        rates: HashMap::from([("EUR".to_string(), 1.08), ("GBP".to_string(), 1.27)]),
    };
    let engine = DecisionEngine::builder()
        .with_loader(loader)
        .with_handler(handler)
        .build();

    let order = json!({"order": {"amount": 250, "currency": "EUR"}});
    let response = engine.evaluate_async("convert.json", order).await?;
    println!("EUR order  ->  {}", response.result);

    let unknown = json!({"order": {"amount": 250, "currency": "CHF"}});
    match engine.evaluate_async("convert.json", unknown.clone()).await {
        Ok(response) => println!("CHF order  ->  {}", response.result),
        Err(e) => println!("CHF order  ->  {} ({})", e, e.kind()),
    }

    let response = engine
        .evaluate_async_with(
            "convert-lenient.json",
            unknown,
            EvaluationOptions::new().with_trace(true),
        )
        .await?;
    println!("CHF order, non-fatal  ->  {}", response.result);
    if let Some(trace) = response.node_trace("fx") {
        println!("  fx trace data: {}", trace.trace_data);
    }

    Ok(())
}
