//! Push notifications over `GET /events`.

mod common;

use common::{client, create_item, item_body, TestServer};
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;

/// Reads the stream until `marker` has been seen `count` times. Returns everything read.
async fn read_until(res: &mut reqwest::Response, marker: &str, count: usize) -> String {
    let mut seen = String::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while seen.matches(marker).count() < count {
            match res.chunk().await.unwrap() {
                Some(bytes) => seen.push_str(&String::from_utf8_lossy(&bytes)),
                None => panic!("stream ended early: {seen}"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {count} x {marker:?}; got {seen:?}"));
    seen
}

/// Collects whatever arrives on the stream within `window`.
async fn read_for(res: &mut reqwest::Response, window: Duration) -> String {
    let mut seen = String::new();
    let _ = tokio::time::timeout(window, async {
        while let Some(bytes) = res.chunk().await.unwrap() {
            seen.push_str(&String::from_utf8_lossy(&bytes));
        }
    })
    .await;
    seen
}

async fn wait_for_subscribers(server: &TestServer, expected: usize) {
    for _ in 0..100 {
        if server.notifier.subscriber_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "expected {expected} subscribers, found {}",
        server.notifier.subscriber_count()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn each_mutation_emits_one_update() {
    let server = TestServer::spawn().await;

    let mut stream = client().get(server.url("/events")).send().await.unwrap();
    assert_eq!(stream.status(), StatusCode::OK);
    let content_type = stream.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"), "{content_type}");
    read_until(&mut stream, ": connected", 1).await;
    wait_for_subscribers(&server, 1).await;

    let item = create_item(&server, item_body("Bias tape", 12.0, Some(4))).await;
    let id = item["id"].as_i64().unwrap();
    let seen = read_until(&mut stream, "event: inventory_update", 1).await;
    assert!(seen.contains(r#"data: {"type":"inventory_update"}"#), "{seen}");

    client()
        .put(server.url(&format!("/api/inventory/{id}/reduce-stock")))
        .json(&json!({ "reduceAmount": 2 }))
        .send()
        .await
        .unwrap();
    let seen = read_until(&mut stream, "event: inventory_update", 1).await;
    assert_eq!(seen.matches("event: inventory_update").count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejected_requests_do_not_notify() {
    let server = TestServer::spawn().await;

    let mut stream = client().get(server.url("/events")).send().await.unwrap();
    read_until(&mut stream, ": connected", 1).await;
    wait_for_subscribers(&server, 1).await;

    let res = client()
        .put(server.url("/api/inventory/42/reduce-stock"))
        .json(&json!({ "reduceAmount": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client()
        .post(server.url("/api/inventory"))
        .json(&json!({ "item_variant": "No catalog refs" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = client()
        .delete(server.url("/api/inventory/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let quiet = read_for(&mut stream, Duration::from_millis(300)).await;
    assert!(!quiet.contains("inventory_update"), "unexpected push: {quiet:?}");

    create_item(&server, item_body("Snap buttons", 30.0, None)).await;
    let seen = read_until(&mut stream, "event: inventory_update", 1).await;
    assert_eq!(seen.matches("event: inventory_update").count(), 1);
    let after = read_for(&mut stream, Duration::from_millis(300)).await;
    assert!(!after.contains("inventory_update"), "duplicate push: {after:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_subscriber_receives_the_update() {
    let server = TestServer::spawn().await;

    let mut first = client().get(server.url("/events")).send().await.unwrap();
    let mut second = client().get(server.url("/events")).send().await.unwrap();
    read_until(&mut first, ": connected", 1).await;
    read_until(&mut second, ": connected", 1).await;
    wait_for_subscribers(&server, 2).await;

    create_item(&server, item_body("Elastic band", 9.0, None)).await;
    read_until(&mut first, "event: inventory_update", 1).await;
    read_until(&mut second, "event: inventory_update", 1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn keep_alive_comments_are_sent() {
    let server = TestServer::spawn_with_keep_alive(Duration::from_millis(100)).await;

    let mut stream = client().get(server.url("/events")).send().await.unwrap();
    read_until(&mut stream, ": keep-alive", 2).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn disconnect_unsubscribes() {
    let server = TestServer::spawn_with_keep_alive(Duration::from_millis(100)).await;

    let mut stream = client().get(server.url("/events")).send().await.unwrap();
    read_until(&mut stream, ": connected", 1).await;
    wait_for_subscribers(&server, 1).await;

    drop(stream);
    wait_for_subscribers(&server, 0).await;
}
