//! Async evaluation tests for DecisionEngine

mod common;

use common::*;
use futures::future::join_all;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use verdict_sdk::{
    CustomNodeRequest, DecisionEngine, RepositoryError, Scheduling, SdkError, Value,
};

fn async_engine() -> DecisionEngine {
    DecisionEngine::builder()
        .with_async_loader(fixture_loader())
        .with_handler_fn(|request: CustomNodeRequest| async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let currency = request.get_field("currency")?;
            Ok::<_, anyhow::Error>(Value::from(json!({"rate": 3, "currency": currency})))
        })
        .build()
}

// ========== End-to-End Tests ==========

#[tokio::test]
async fn test_async_function_and_table_documents() {
    let engine = async_engine();

    let response = engine.evaluate_async("function.json", json!({"input": 5})).await.unwrap();
    assert_eq!(serde_json::Value::from(response.result), json!({"output": 10}));

    let response = engine.evaluate_async("table.json", json!({"input": 12})).await.unwrap();
    assert_eq!(serde_json::Value::from(response.result), json!({"output": 10}));
}

#[tokio::test]
async fn test_decision_handle_async() {
    let engine = async_engine();
    let decision = engine.get_decision_async("nested.json").await.unwrap();
    assert_eq!(decision.key(), Some("nested.json"));

    let response = decision.evaluate_async(json!({"input": 21})).await.unwrap();
    assert_eq!(serde_json::Value::from(response.result), json!({"output": 42}));
}

#[tokio::test]
async fn test_blocking_and_async_modes_agree() {
    let engine = DecisionEngine::builder().with_loader(fixture_loader()).build();
    let decision = engine.create_decision(bytes(&table_document())).unwrap();

    for input in [json!({"input": 3}), json!({"input": 30})] {
        let blocking = decision.evaluate(input.clone()).unwrap();
        let suspended = decision.evaluate_async(input).await.unwrap();
        assert_eq!(blocking.result, suspended.result);
    }
}

// ========== Cache Coalescing Tests ==========

#[tokio::test(start_paused = true)]
async fn test_concurrent_resolves_load_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let engine = DecisionEngine::builder()
        .with_loader_fn(move |key: String| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                match key.as_str() {
                    "function.json" => Ok(bytes(&function_document())),
                    _ => Err(RepositoryError::NotFound(key.clone())),
                }
            }
        })
        .build();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.evaluate_async("function.json", json!({"input": i})).await })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let response = task.await.unwrap().unwrap();
        assert_eq!(
            serde_json::Value::from(response.result),
            json!({"output": i * 2})
        );
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(engine.cache_stats().compilations, 1);
}

#[tokio::test]
async fn test_async_load_failure_is_retried() {
    let available = Arc::new(AtomicBool::new(false));
    let flag = available.clone();
    let engine = DecisionEngine::builder()
        .with_loader_fn(move |key: String| {
            let ready = flag.load(Ordering::SeqCst);
            async move {
                if ready {
                    Ok(bytes(&function_document()))
                } else {
                    Err(RepositoryError::internal(key, anyhow::anyhow!("storage offline")))
                }
            }
        })
        .build();

    let err = engine.evaluate_async("function.json", json!({"input": 1})).await.unwrap_err();
    assert!(matches!(&err, SdkError::DocumentLoad { cause, .. } if cause.contains("storage offline")));

    available.store(true, Ordering::SeqCst);
    let response = engine.evaluate_async("function.json", json!({"input": 1})).await.unwrap();
    assert_eq!(serde_json::Value::from(response.result), json!({"output": 2}));
}

// ========== Suspending Handler Tests ==========

#[tokio::test(start_paused = true)]
async fn test_batched_evaluations_suspend_independently() {
    let engine = async_engine();
    let started = Instant::now();

    let responses = join_all(["EUR", "USD", "GBP"].map(|currency| {
        engine.evaluate_async("custom.json", json!({"currency": currency, "amount": 1}))
    }))
    .await;

    assert!(started.elapsed() < Duration::from_millis(150));
    for (response, currency) in responses.into_iter().zip(["EUR", "USD", "GBP"]) {
        assert_eq!(
            serde_json::Value::from(response.unwrap().result),
            json!({"rate": 3, "currency": currency, "base": 1})
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_scheduling_with_suspending_handler() {
    let engine = DecisionEngine::builder()
        .with_async_loader(fixture_loader())
        .with_scheduling(Scheduling::Concurrent)
        .with_handler_fn(|_| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, anyhow::Error>(Value::from(json!({"rate": 1})))
        })
        .build();

    let response = engine
        .evaluate_async("custom.json", json!({"amount": 9}))
        .await
        .unwrap();
    assert_eq!(serde_json::Value::from(response.result), json!({"rate": 1, "base": 9}));
}

#[tokio::test]
async fn test_async_fatal_and_non_fatal_failures() {
    let engine = DecisionEngine::builder()
        .with_async_loader(fixture_loader())
        .with_handler_fn(|_| async { Err::<Value, _>(anyhow::anyhow!("quota exceeded")) })
        .build();

    let err = engine.evaluate_async("custom.json", json!({"amount": 2})).await.unwrap_err();
    assert_eq!(err.kind(), "CustomHandlerError");
    assert_eq!(err.node_id(), Some("fx"));

    let response = engine
        .evaluate_async("custom-non-fatal.json", json!({"amount": 2}))
        .await
        .unwrap();
    assert_eq!(serde_json::Value::from(response.result), json!({"base": 2}));
}

// ========== Cancellation Tests ==========

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn test_dropping_evaluation_cancels_handler() {
    let started = Arc::new(AtomicBool::new(false));
    let dropped = Arc::new(AtomicBool::new(false));
    let (started_flag, dropped_flag) = (started.clone(), dropped.clone());

    let engine = DecisionEngine::builder()
        .with_async_loader(fixture_loader())
        .with_handler_fn(move |request: CustomNodeRequest| {
            let started = started_flag.clone();
            let guard = DropFlag(dropped_flag.clone());
            async move {
                let _guard = guard;
                started.store(true, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, anyhow::Error>(request.input)
            }
        })
        .build();

    let outcome = tokio::time::timeout(
        Duration::from_secs(1),
        engine.evaluate_async("custom.json", json!({"amount": 1})),
    )
    .await;

    assert!(outcome.is_err());
    assert!(started.load(Ordering::SeqCst));
    assert!(dropped.load(Ordering::SeqCst));

    // Other evaluations on the same engine are unaffected
    let response = engine.evaluate_async("function.json", json!({"input": 2})).await.unwrap();
    assert_eq!(serde_json::Value::from(response.result), json!({"output": 4}));
}
