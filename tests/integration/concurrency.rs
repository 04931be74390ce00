//! Concurrency tests
//!
//! These tests verify that:
//! - Concurrent ingestion for different services loses nothing
//! - Concurrent ingestion for one service keeps each sender's order
//! - Readers never see a partially applied append
//! - Alerts for a service are recorded in the order of its samples

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use telemetry_hub::Hub;

use crate::helpers::*;

fn at(base: DateTime<Utc>, offset: i64) -> DateTime<Utc> {
    base + Duration::seconds(offset)
}

async fn ingest(hub: &Hub, agent_id: &str, taken_at: DateTime<Utc>, cpu: f64) {
    let body = create_payload(agent_id, taken_at, cpu).to_string();
    hub.ingest_bytes(body.as_bytes()).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_services_do_not_interfere() {
    let hub = Arc::new(Hub::in_memory());
    let base = Utc::now();

    let tasks = ["alpha", "beta"].map(|agent| {
        let hub = hub.clone();
        tokio::spawn(async move {
            for i in 0..200 {
                ingest(&hub, agent, at(base, i), i as f64 % 100.0).await;
            }
        })
    });
    for result in join_all(tasks).await {
        result.unwrap();
    }

    for agent in ["alpha", "beta"] {
        let timestamps: Vec<_> = hub
            .history(agent)
            .await
            .iter()
            .map(|s| s.timestamp)
            .collect();
        let expected: Vec<_> = (0..200).map(|i| at(base, i).timestamp()).collect();
        assert_eq!(timestamps, expected, "{agent}");
    }
    assert_eq!(hub.services().await, vec!["alpha", "beta"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_service_keeps_each_senders_order() {
    let hub = Arc::new(Hub::in_memory());
    let base = Utc::now();
    let senders = 8;
    let per_sender = 50;

    let tasks: Vec<_> = (0..senders)
        .map(|sender| {
            let hub = hub.clone();
            tokio::spawn(async move {
                for i in 0..per_sender {
                    ingest(&hub, "shared", at(base, sender * 1_000 + i), 1.0).await;
                }
            })
        })
        .collect();
    for result in join_all(tasks).await {
        result.unwrap();
    }

    let history = hub.history("shared").await;
    assert_eq!(history.len(), (senders * per_sender) as usize);

    for sender in 0..senders {
        let low = at(base, sender * 1_000).timestamp();
        let high = low + per_sender;
        let own: Vec<_> = history
            .iter()
            .map(|s| s.timestamp)
            .filter(|ts| (low..high).contains(ts))
            .collect();
        let expected: Vec<_> = (low..high).collect();
        assert_eq!(own, expected, "sender {sender}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_see_whole_samples_only() {
    let hub = Arc::new(Hub::in_memory());
    let base = Utc::now();

    let writer = {
        let hub = hub.clone();
        tokio::spawn(async move {
            for i in 0..300 {
                ingest(&hub, "busy", at(base, i), 42.0).await;
            }
        })
    };

    let reader = {
        let hub = hub.clone();
        tokio::spawn(async move {
            let mut last_len = 0;
            while last_len < 300 {
                let history = hub.history("busy").await;
                assert!(history.len() >= last_len, "history shrank");
                assert!(history.iter().all(|s| s.cpu == 42.0 && s.memory == 48.3));
                last_len = history.len();
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_alert_order_follows_sample_order() {
    let hub = Arc::new(Hub::in_memory());
    let base = Utc::now();

    let tasks: Vec<_> = (0..16)
        .map(|sender| {
            let hub = hub.clone();
            tokio::spawn(async move {
                for i in 0..20 {
                    ingest(&hub, "hot", at(base, sender * 1_000 + i), 95.0).await;
                }
            })
        })
        .collect();
    for result in join_all(tasks).await {
        result.unwrap();
    }

    let sample_order: Vec<_> = hub.history("hot").await.iter().map(|s| s.timestamp).collect();
    let alert_order: Vec<_> = hub.alerts("hot").await.iter().map(|a| a.timestamp).collect();

    assert_eq!(sample_order.len(), 320);
    assert_eq!(alert_order, sample_order);
}
