//! Storage contract shared by the Postgres and in-memory backends.

use crate::domain::{
    Catalog, CatalogEntry, DashboardStats, InventoryItem, ItemChanges, NewItem, RawTable,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),
    /// A referenced catalog row does not exist.
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Computes the changes for an update from the row as it is inside the write transaction.
pub type UpdatePlan = Box<dyn FnOnce(&InventoryItem) -> ItemChanges + Send>;

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Short configuration hint surfaced in 500 responses.
    fn diagnostic_hint(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;

    /// All items ordered by id.
    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>>;

    async fn get_item(&self, id: i32) -> StoreResult<Option<InventoryItem>>;

    async fn insert_item(&self, item: &NewItem) -> StoreResult<InventoryItem>;

    /// Read-modify-write of a single row.
    ///
    /// The plan sees the current row while it is locked, so concurrent writers to the same item
    /// are serialized. Returns `None` when the item does not exist; `updated_at` is bumped on
    /// every non-empty change set.
    async fn update_item_with(&self, id: i32, plan: UpdatePlan) -> StoreResult<Option<InventoryItem>>;

    /// Returns `false` when the item does not exist.
    async fn delete_item(&self, id: i32) -> StoreResult<bool>;

    /// Catalog rows ordered by name.
    async fn list_catalog(&self, catalog: Catalog) -> StoreResult<Vec<CatalogEntry>>;

    async fn dashboard_stats(&self, low_stock_fallback: f64) -> StoreResult<DashboardStats>;

    /// Raw rows of a table ordered by id, one JSON object per row.
    async fn raw_table(&self, table: RawTable) -> StoreResult<Vec<JsonValue>>;
}
