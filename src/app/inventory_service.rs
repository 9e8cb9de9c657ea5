//! The inventory service.
//!
//! Sits between the HTTP handlers and the store. It is responsible for:
//! 1.  Validating write inputs (required fields, non-negative quantities, positive reductions).
//! 2.  Deciding the stored status through the status policy, inside the store's
//!     read-modify-write so the current status is never stale.
//! 3.  Broadcasting a change signal after every committed mutation.

use crate::app::change_notifier::ChangeNotifier;
use crate::domain::{
    derive_status, initial_status, resolve_write_status, Catalog, CatalogEntry, DashboardStats,
    InventoryItem, ItemChanges, ItemStatus, NewItem, RawTable, StatusWrite, StockLevels,
};
use crate::storage::{InventoryStore, StoreError};
use serde_json::Value as JsonValue;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Item not found")]
    NotFound,
    #[error("{source}")]
    Store {
        #[source]
        source: StoreError,
        hint: &'static str,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Fields of an add-item request after JSON coercion. Required fields are still optional here
/// so that the service can report every missing one at once.
#[derive(Debug, Clone, Default)]
pub struct CreateItemInput {
    pub item_type_id: Option<i32>,
    pub item_variant: Option<String>,
    pub stock: Option<f64>,
    pub stock_unit_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub reorder_point: Option<i32>,
    pub status: StatusWrite,
}

/// Partial update. `reorder_point: Some(None)` clears the threshold.
#[derive(Debug, Clone, Default)]
pub struct UpdateItemInput {
    pub item_type_id: Option<i32>,
    pub item_variant: Option<String>,
    pub stock: Option<f64>,
    pub stock_unit_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub reorder_point: Option<Option<i32>>,
    pub status: StatusWrite,
}

impl UpdateItemInput {
    fn is_empty(&self) -> bool {
        self.item_type_id.is_none()
            && self.item_variant.is_none()
            && self.stock.is_none()
            && self.stock_unit_id.is_none()
            && self.supplier_id.is_none()
            && self.reorder_point.is_none()
            && self.status.is_unspecified()
    }

    fn touches_levels(&self) -> bool {
        self.stock.is_some() || self.reorder_point.is_some()
    }

    /// Turns the request into column changes against the row as it currently is.
    fn plan(self, current: &InventoryItem) -> ItemChanges {
        let changed_levels = self.touches_levels().then(|| StockLevels {
            stock: self.stock.unwrap_or(current.stock),
            reorder_point: self.reorder_point.unwrap_or(current.reorder_point),
        });
        let status = resolve_write_status(current.status, self.status, changed_levels);

        ItemChanges {
            item_type_id: self.item_type_id,
            item_variant: self.item_variant,
            stock: self.stock,
            stock_unit_id: self.stock_unit_id,
            supplier_id: self.supplier_id,
            reorder_point: self.reorder_point,
            status,
        }
    }
}

pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    notifier: ChangeNotifier,
    low_stock_fallback: f64,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>, notifier: ChangeNotifier, low_stock_fallback: f64) -> Self {
        Self {
            store,
            notifier,
            low_stock_fallback,
        }
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    fn store_failed(&self, source: StoreError) -> ServiceError {
        tracing::error!(error = %source, "store operation failed");
        ServiceError::Store {
            source,
            hint: self.store.diagnostic_hint(),
        }
    }

    fn committed(&self, action: &'static str, item: &InventoryItem) {
        tracing::info!(action, item_id = item.id, status = %item.status, stock = item.stock, "inventory item changed");
        self.notifier.broadcast();
    }

    pub async fn ping(&self) -> ServiceResult<()> {
        self.store.ping().await.map_err(|e| self.store_failed(e))
    }

    pub async fn list_items(&self) -> ServiceResult<Vec<InventoryItem>> {
        self.store.list_items().await.map_err(|e| self.store_failed(e))
    }

    pub async fn get_item(&self, id: i32) -> ServiceResult<InventoryItem> {
        self.store
            .get_item(id)
            .await
            .map_err(|e| self.store_failed(e))?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn create_item(&self, input: CreateItemInput) -> ServiceResult<InventoryItem> {
        let item_variant = input
            .item_variant
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let mut missing = Vec::new();
        if input.item_type_id.is_none() {
            missing.push("item_type_id");
        }
        if item_variant.is_none() {
            missing.push("item_variant");
        }
        if input.stock.is_none() {
            missing.push("stock");
        }
        if input.stock_unit_id.is_none() {
            missing.push("stock_unit_id");
        }
        if input.supplier_id.is_none() {
            missing.push("supplier_id");
        }

        let (Some(item_type_id), Some(item_variant), Some(stock), Some(stock_unit_id), Some(supplier_id)) = (
            input.item_type_id,
            item_variant,
            input.stock,
            input.stock_unit_id,
            input.supplier_id,
        ) else {
            return Err(ServiceError::InvalidInput(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        validate_stock(stock)?;
        validate_reorder_point(input.reorder_point)?;

        let levels = StockLevels {
            stock,
            reorder_point: input.reorder_point,
        };
        let new_item = NewItem {
            item_type_id,
            item_variant,
            stock,
            stock_unit_id,
            supplier_id,
            reorder_point: input.reorder_point,
            status: initial_status(input.status, levels),
        };

        let created = self
            .store
            .insert_item(&new_item)
            .await
            .map_err(|e| self.store_failed(e))?;
        self.committed("create", &created);
        Ok(created)
    }

    pub async fn update_item(&self, id: i32, mut input: UpdateItemInput) -> ServiceResult<InventoryItem> {
        if input.is_empty() {
            return Err(ServiceError::InvalidInput("No fields to update".to_string()));
        }
        if let Some(stock) = input.stock {
            validate_stock(stock)?;
        }
        if let Some(reorder_point) = input.reorder_point {
            validate_reorder_point(reorder_point)?;
        }
        if let Some(variant) = input.item_variant.take() {
            let variant = variant.trim().to_string();
            if variant.is_empty() {
                return Err(ServiceError::InvalidInput(
                    "item_variant must not be empty".to_string(),
                ));
            }
            input.item_variant = Some(variant);
        }

        let updated = self
            .store
            .update_item_with(id, Box::new(move |current: &InventoryItem| input.plan(current)))
            .await
            .map_err(|e| self.store_failed(e))?
            .ok_or(ServiceError::NotFound)?;
        self.committed("update", &updated);
        Ok(updated)
    }

    /// Decrements stock by `amount`, flooring at zero, and recomputes the status.
    pub async fn reduce_stock(&self, id: i32, amount: f64) -> ServiceResult<InventoryItem> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(ServiceError::InvalidInput("Invalid reduce amount".to_string()));
        }

        let updated = self
            .store
            .update_item_with(
                id,
                Box::new(move |current: &InventoryItem| {
                    let stock = (current.stock - amount).max(0.0);
                    ItemChanges {
                        stock: Some(stock),
                        status: Some(derive_status(stock, current.reorder_point, current.status)),
                        ..ItemChanges::default()
                    }
                }),
            )
            .await
            .map_err(|e| self.store_failed(e))?
            .ok_or(ServiceError::NotFound)?;
        self.committed("reduce-stock", &updated);
        Ok(updated)
    }

    pub async fn phase_out(&self, id: i32) -> ServiceResult<InventoryItem> {
        let updated = self
            .store
            .update_item_with(
                id,
                Box::new(|_: &InventoryItem| ItemChanges {
                    status: Some(ItemStatus::PhasedOut),
                    ..ItemChanges::default()
                }),
            )
            .await
            .map_err(|e| self.store_failed(e))?
            .ok_or(ServiceError::NotFound)?;
        self.committed("phase-out", &updated);
        Ok(updated)
    }

    pub async fn delete_item(&self, id: i32) -> ServiceResult<()> {
        let deleted = self
            .store
            .delete_item(id)
            .await
            .map_err(|e| self.store_failed(e))?;
        if !deleted {
            return Err(ServiceError::NotFound);
        }
        tracing::info!(item_id = id, "inventory item deleted");
        self.notifier.broadcast();
        Ok(())
    }

    pub async fn catalog(&self, catalog: Catalog) -> ServiceResult<Vec<CatalogEntry>> {
        self.store
            .list_catalog(catalog)
            .await
            .map_err(|e| self.store_failed(e))
    }

    pub async fn dashboard(&self) -> ServiceResult<DashboardStats> {
        self.store
            .dashboard_stats(self.low_stock_fallback)
            .await
            .map_err(|e| self.store_failed(e))
    }

    pub async fn raw_table(&self, table: RawTable) -> ServiceResult<Vec<JsonValue>> {
        self.store
            .raw_table(table)
            .await
            .map_err(|e| self.store_failed(e))
    }

    /// Every raw table in one object, keyed by table name.
    pub async fn raw_all(&self) -> ServiceResult<JsonValue> {
        let mut all = serde_json::Map::new();
        for table in RawTable::ALL {
            let rows = self.raw_table(table).await?;
            all.insert(table.table_name().to_string(), JsonValue::Array(rows));
        }
        Ok(JsonValue::Object(all))
    }
}

fn validate_stock(stock: f64) -> ServiceResult<()> {
    if stock.is_finite() && stock >= 0.0 {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(
            "stock must be a non-negative number".to_string(),
        ))
    }
}

fn validate_reorder_point(reorder_point: Option<i32>) -> ServiceResult<()> {
    match reorder_point {
        Some(r) if r < 0 => Err(ServiceError::InvalidInput(
            "reorder_point must be a non-negative integer".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::change_notifier::Signal;
    use crate::domain::ManualStatus;
    use crate::storage::InMemoryInventoryStore;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    fn service() -> InventoryService {
        InventoryService::new(
            Arc::new(InMemoryInventoryStore::with_default_catalogs()),
            ChangeNotifier::default(),
            10.0,
        )
    }

    fn create_input(stock: f64, reorder_point: Option<i32>) -> CreateItemInput {
        CreateItemInput {
            item_type_id: Some(1),
            item_variant: Some("Cotton twill".to_string()),
            stock: Some(stock),
            stock_unit_id: Some(1),
            supplier_id: Some(1),
            reorder_point,
            status: StatusWrite::Unspecified,
        }
    }

    #[tokio::test]
    async fn create_reports_all_missing_fields() {
        let err = service()
            .create_item(CreateItemInput {
                item_variant: Some("   ".to_string()),
                ..CreateItemInput::default()
            })
            .await
            .unwrap_err();
        match err {
            ServiceError::InvalidInput(msg) => {
                assert_eq!(
                    msg,
                    "Missing required fields: item_type_id, item_variant, stock, stock_unit_id, supplier_id"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_derives_status_from_levels() {
        let svc = service();
        let item = svc.create_item(create_input(5.0, Some(10))).await.unwrap();
        assert_eq!(item.status, ItemStatus::LowStock);

        let item = svc.create_item(create_input(0.0, None)).await.unwrap();
        assert_eq!(item.status, ItemStatus::OutOfStock);
    }

    #[tokio::test]
    async fn reduce_stock_floors_at_zero() {
        let svc = service();
        let item = svc.create_item(create_input(10.0, Some(3))).await.unwrap();

        let reduced = svc.reduce_stock(item.id, 15.0).await.unwrap();
        assert_eq!(reduced.stock, 0.0);
        assert_eq!(reduced.status, ItemStatus::OutOfStock);
    }

    #[tokio::test]
    async fn reduce_stock_rejects_non_positive_amounts() {
        let svc = service();
        let item = svc.create_item(create_input(10.0, None)).await.unwrap();
        for amount in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                svc.reduce_stock(item.id, amount).await,
                Err(ServiceError::InvalidInput(_))
            ));
        }
    }

    #[tokio::test]
    async fn phased_out_item_keeps_status_through_stock_updates() {
        let svc = service();
        let item = svc.create_item(create_input(10.0, Some(3))).await.unwrap();
        svc.phase_out(item.id).await.unwrap();

        let updated = svc
            .update_item(
                item.id,
                UpdateItemInput {
                    stock: Some(1.0),
                    ..UpdateItemInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ItemStatus::PhasedOut);

        let reduced = svc.reduce_stock(item.id, 1.0).await.unwrap();
        assert_eq!(reduced.status, ItemStatus::PhasedOut);
    }

    #[tokio::test]
    async fn restocking_override_is_stored_as_is() {
        let svc = service();
        let item = svc.create_item(create_input(0.0, Some(3))).await.unwrap();
        let updated = svc
            .update_item(
                item.id,
                UpdateItemInput {
                    stock: Some(1.0),
                    status: StatusWrite::Override(ManualStatus::Restocking),
                    ..UpdateItemInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ItemStatus::Restocking);
        assert_eq!(updated.stock, 1.0);
    }

    #[tokio::test]
    async fn clearing_reorder_point_recomputes_status() {
        let svc = service();
        let item = svc.create_item(create_input(2.0, Some(5))).await.unwrap();
        assert_eq!(item.status, ItemStatus::LowStock);

        let updated = svc
            .update_item(
                item.id,
                UpdateItemInput {
                    reorder_point: Some(None),
                    ..UpdateItemInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.reorder_point, None);
        assert_eq!(updated.status, ItemStatus::Available);
    }

    #[tokio::test]
    async fn empty_update_and_missing_item_are_rejected() {
        let svc = service();
        assert!(matches!(
            svc.update_item(1, UpdateItemInput::default()).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.update_item(
                42,
                UpdateItemInput {
                    stock: Some(1.0),
                    ..UpdateItemInput::default()
                }
            )
            .await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(svc.phase_out(42).await, Err(ServiceError::NotFound)));
        assert!(matches!(svc.delete_item(42).await, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn failed_writes_do_not_broadcast() {
        let svc = service();
        let mut subscription = svc.notifier().subscribe();
        let quiet = Duration::from_millis(50);

        assert!(matches!(svc.reduce_stock(42, 1.0).await, Err(ServiceError::NotFound)));
        assert!(matches!(svc.phase_out(42).await, Err(ServiceError::NotFound)));
        assert!(matches!(svc.delete_item(42).await, Err(ServiceError::NotFound)));
        assert!(matches!(
            svc.update_item(42, UpdateItemInput::default()).await,
            Err(ServiceError::InvalidInput(_))
        ));
        let mut dangling = create_input(1.0, None);
        dangling.supplier_id = Some(404);
        assert!(matches!(svc.create_item(dangling).await, Err(ServiceError::Store { .. })));

        assert!(
            tokio::time::timeout(quiet, subscription.next()).await.is_err(),
            "a rejected write queued a signal"
        );

        let item = svc.create_item(create_input(4.0, None)).await.unwrap();
        assert_eq!(subscription.next().await, Some(Signal::Update));
        assert!(tokio::time::timeout(quiet, subscription.next()).await.is_err());

        assert!(svc.reduce_stock(item.id, 0.0).await.is_err());
        svc.reduce_stock(item.id, 1.0).await.unwrap();
        assert_eq!(subscription.next().await, Some(Signal::Update));
        assert!(tokio::time::timeout(quiet, subscription.next()).await.is_err());
    }

    #[tokio::test]
    async fn store_errors_carry_the_configuration_hint() {
        let svc = service();
        let mut input = create_input(1.0, None);
        input.supplier_id = Some(404);
        match svc.create_item(input).await {
            Err(ServiceError::Store { hint, .. }) => {
                assert_eq!(hint, "In-memory store (DATABASE_URL not used)")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
