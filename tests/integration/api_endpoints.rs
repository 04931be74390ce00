//! Integration tests for API endpoints
//!
//! These tests verify that:
//! - Every endpoint answers with the documented JSON shape
//! - Invalid payloads are rejected with 400 and leave no trace
//! - Status follows the freshness window
//! - Unknown services are answered with empty values, never errors

use std::sync::Arc;

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{Value, json};
use telemetry_hub::Hub;

use crate::helpers::*;

async fn get(addr: std::net::SocketAddr, path: &str) -> (StatusCode, Value) {
    let response = reqwest::get(url(addr, path)).await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn post_json(addr: std::net::SocketAddr, body: &Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(url(addr, "/ingest"))
        .bearer_auth("test-token")
        .json(body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_health_endpoint_returns_up() {
    let addr = spawn_test_api(Arc::new(Hub::in_memory())).await;

    let (status, body) = get(addr, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "up"}));
}

#[tokio::test]
async fn test_ingest_then_query_everything() {
    let addr = spawn_test_api(Arc::new(Hub::in_memory())).await;
    let taken_at = Utc::now();

    let (status, body) = post_json(addr, &create_payload("web-1", taken_at, 12.5)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (_, services) = get(addr, "/services").await;
    assert_eq!(services, json!(["web-1"]));

    let (_, metrics) = get(addr, "/metrics/web-1").await;
    assert_eq!(
        metrics,
        json!([{
            "timestamp": taken_at.timestamp(),
            "cpu": 12.5,
            "memory": 48.3,
            "disk": 61.0,
            "net_in": 1200.0,
            "net_out": 800.0
        }])
    );

    let (_, status) = get(addr, "/status/web-1").await;
    assert_eq!(status, json!({"status": "UP"}));

    let (_, alerts) = get(addr, "/alerts/web-1").await;
    assert_eq!(alerts, json!([]));

    let (_, count) = get(addr, "/alerts/active/web-1").await;
    assert_eq!(count, json!({"count": 0}));
}

#[tokio::test]
async fn test_services_are_sorted_and_deduplicated() {
    let addr = spawn_test_api(Arc::new(Hub::in_memory())).await;

    for agent in ["zeta", "alpha", "mid", "alpha"] {
        let (status, _) = post_json(addr, &create_payload_now(agent, 1.0)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, services) = get(addr, "/services").await;
    assert_eq!(services, json!(["alpha", "mid", "zeta"]));
}

#[tokio::test]
async fn test_cpu_alert_is_strictly_above_80() {
    let addr = spawn_test_api(Arc::new(Hub::in_memory())).await;
    let taken_at = Utc::now();

    post_json(addr, &create_payload("web-1", taken_at, 80.0)).await;
    let (_, count) = get(addr, "/alerts/active/web-1").await;
    assert_eq!(count, json!({"count": 0}));

    post_json(addr, &create_payload("web-1", taken_at, 81.0)).await;
    let (_, alerts) = get(addr, "/alerts/web-1").await;
    assert_eq!(
        alerts,
        json!([{"timestamp": taken_at.timestamp(), "type": "CPU", "value": 81.0}])
    );

    let (_, count) = get(addr, "/alerts/active/web-1").await;
    assert_eq!(count, json!({"count": 1}));
}

#[tokio::test]
async fn test_stale_service_is_down_but_still_listed() {
    let addr = spawn_test_api(Arc::new(Hub::in_memory())).await;

    post_json(
        addr,
        &create_payload("old-box", Utc::now() - Duration::seconds(60), 5.0),
    )
    .await;

    let (_, status) = get(addr, "/status/old-box").await;
    assert_eq!(status, json!({"status": "DOWN"}));

    let (_, services) = get(addr, "/services").await;
    assert_eq!(services, json!(["old-box"]));
}

#[tokio::test]
async fn test_unknown_service_queries_are_empty() {
    let addr = spawn_test_api(Arc::new(Hub::in_memory())).await;

    let (status, metrics) = get(addr, "/metrics/ghost").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics, json!([]));

    let (status, alerts) = get(addr, "/alerts/ghost").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts, json!([]));

    let (status, state) = get(addr, "/status/ghost").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state, json!({"status": "DOWN"}));

    let (status, count) = get(addr, "/alerts/active/ghost").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, json!({"count": 0}));
}

#[tokio::test]
async fn test_invalid_payloads_are_rejected_without_side_effects() {
    let addr = spawn_test_api(Arc::new(Hub::in_memory())).await;

    let mut missing_agent = create_payload_now("web-1", 99.0);
    missing_agent.as_object_mut().unwrap().remove("agent_id");

    let mut missing_timestamp = create_payload_now("web-1", 99.0);
    missing_timestamp.as_object_mut().unwrap().remove("timestamp");

    let mut empty_agent = create_payload_now("web-1", 99.0);
    empty_agent["agent_id"] = json!("");

    let mut bad_timestamp = create_payload_now("web-1", 99.0);
    bad_timestamp["timestamp"] = json!("last tuesday");

    for payload in [missing_agent, missing_timestamp, empty_agent, bad_timestamp] {
        let (status, body) = post_json(addr, &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert!(body["error"].is_string(), "{body}");
    }

    let (_, services) = get(addr, "/services").await;
    assert_eq!(services, json!([]));
    let (_, metrics) = get(addr, "/metrics/web-1").await;
    assert_eq!(metrics, json!([]));
    let (_, alerts) = get(addr, "/alerts/web-1").await;
    assert_eq!(alerts, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let addr = spawn_test_api(Arc::new(Hub::in_memory())).await;

    let response = reqwest::Client::new()
        .post(url(addr, "/ingest"))
        .header("content-type", "application/json")
        .body("{\"agent_id\": \"web-1\", ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid payload"));
}

#[tokio::test]
async fn test_missing_metrics_are_zero() {
    let addr = spawn_test_api(Arc::new(Hub::in_memory())).await;
    let taken_at = Utc::now();

    let (status, _) = post_json(
        addr,
        &json!({"agent_id": "bare", "timestamp": taken_at.to_rfc3339()}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, metrics) = get(addr, "/metrics/bare").await;
    assert_eq!(
        metrics,
        json!([{
            "timestamp": taken_at.timestamp(),
            "cpu": 0.0,
            "memory": 0.0,
            "disk": 0.0,
            "net_in": 0.0,
            "net_out": 0.0
        }])
    );
}
