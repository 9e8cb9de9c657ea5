//! Shared harness: the production router over an in-memory store, bound to an ephemeral port.

#![allow(dead_code)]

use axum::Router;
use operix_inventory::transport::http::{create_router, with_frontend, AppState};
use operix_inventory::{ChangeNotifier, InMemoryInventoryStore, InventoryService};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct TestServer {
    pub base_url: String,
    pub notifier: ChangeNotifier,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        Self::spawn_with_keep_alive(Duration::from_secs(20)).await
    }

    pub async fn spawn_with_keep_alive(keep_alive: Duration) -> Self {
        Self::spawn_app(keep_alive, |router| router).await
    }

    /// Same router, wrapped with frontend hosting from `build_dir`.
    pub async fn spawn_with_frontend(build_dir: &Path) -> Self {
        let build_dir = build_dir.to_path_buf();
        Self::spawn_app(Duration::from_secs(20), move |router| {
            with_frontend(router, &build_dir)
        })
        .await
    }

    async fn spawn_app(keep_alive: Duration, wrap: impl FnOnce(Router) -> Router) -> Self {
        let store = Arc::new(InMemoryInventoryStore::with_default_catalogs());
        let notifier = ChangeNotifier::new(keep_alive);
        let inventory = Arc::new(InventoryService::new(store, notifier.clone(), 10.0));
        let app = wrap(create_router(AppState::new(inventory)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            notifier,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// A valid add-item body referencing the first default catalog rows.
pub fn item_body(variant: &str, stock: f64, reorder_point: Option<i32>) -> Value {
    json!({
        "item_type_id": 1,
        "item_variant": variant,
        "stock": stock,
        "stock_unit_id": 1,
        "supplier_id": 1,
        "reorder_point": reorder_point,
    })
}

pub async fn create_item(server: &TestServer, body: Value) -> Value {
    let res = client()
        .post(server.url("/api/inventory"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    res.json().await.unwrap()
}
