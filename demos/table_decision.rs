//! Decision table example
//!
//! This example demonstrates:
//! - Loading documents from a directory with `FilesystemLoader`
//! - First-hit and collect hit policies
//! - Unary conditions and intervals in table cells

use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verdict_sdk::{DecisionEngine, FilesystemLoader};

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

fn table(hit_policy: &str) -> serde_json::Value {
    json!({
        "nodes": [
            {"id": "in", "name": "Request", "type": "inputNode"},
            {
                "id": "shipping",
                "name": "Shipping",
                "type": "decisionTableNode",
                "content": {
                    "hitPolicy": hit_policy,
                    "inputs": [
                        {"id": "country", "name": "Country", "field": "customer.country"},
                        {"id": "weight", "name": "Weight", "field": "order.weight"}
                    ],
                    "outputs": [
                        {"id": "fee", "name": "Fee", "field": "shipping.fee"},
                        {"id": "carrier", "name": "Carrier", "field": "shipping.carrier"}
                    ],
                    "rules": [
                        {"_id": "r1", "_description": "Domestic light", "country": "'US'", "weight": "[0..5]", "fee": "4.99", "carrier": "'post'"},
                        {"_id": "r2", "_description": "Domestic heavy", "country": "'US'", "weight": "> 5", "fee": "9.99 + order.weight * 0.5", "carrier": "'freight'"},
                        {"_id": "r3", "_description": "Europe", "country": "'FR','DE','ES'", "weight": "", "fee": "14.5", "carrier": "'express'"},
                        {"_id": "r4", "_description": "Fallback", "country": "", "weight": "", "fee": "25", "carrier": "'courier'"}
                    ]
                }
            },
            {"id": "out", "name": "Response", "type": "outputNode"}
        ],
        "edges": [
            {"id": "e1", "sourceId": "in", "targetId": "shipping"},
            {"id": "e2", "sourceId": "shipping", "targetId": "out"}
        ]
    })
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    println!("=== Decision Table Example ===\n");

    let dir = std::env::temp_dir().join("verdict-table-demo");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("shipping.json"), serde_json::to_vec_pretty(&table("first"))?)?;
    std::fs::write(dir.join("shipping-all.json"), serde_json::to_vec_pretty(&table("collect"))?)?;

    let engine = DecisionEngine::builder()
        .with_loader(FilesystemLoader::new(&dir)?.keep_in_memory(true))
        .build();

    let orders = [
        json!({"customer": {"country": "US"}, "order": {"weight": 2}}),
        json!({"customer": {"country": "US"}, "order": {"weight": 12}}),
        json!({"customer": {"country": "DE"}, "order": {"weight": 1}}),
        json!({"customer": {"country": "JP"}, "order": {"weight": 3}}),
    ];

    println!("First hit:");
    for order in &orders {
        let response = engine.evaluate("shipping", order.clone())?;
        println!("  {}  ->  {}", order, response.result);
    }

    println!("\nCollect:");
    for order in &orders {
        let response = engine.evaluate("shipping-all", order.clone())?;
        println!("  {}  ->  {}", order, response.result);
    }

    Ok(())
}
