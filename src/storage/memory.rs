use crate::domain::{
    Catalog, CatalogEntry, DashboardStats, InventoryItem, ItemChanges, ItemStatus, NewItem,
    RawTable,
};
use crate::storage::store::{InventoryStore, StoreError, StoreResult, UpdatePlan};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Row as it would sit in `inventory_items`, without joined names.
#[derive(Debug, Clone, Serialize)]
struct StoredItem {
    id: i32,
    item_type_id: i32,
    item_variant: String,
    stock: f64,
    stock_unit_id: i32,
    supplier_id: i32,
    reorder_point: Option<i32>,
    status: ItemStatus,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    items: BTreeMap<i32, StoredItem>,
    next_item_id: i32,
    item_types: Vec<CatalogEntry>,
    stock_units: Vec<CatalogEntry>,
    suppliers: Vec<CatalogEntry>,
}

impl MemoryState {
    fn catalog(&self, catalog: Catalog) -> &Vec<CatalogEntry> {
        match catalog {
            Catalog::ItemTypes => &self.item_types,
            Catalog::StockUnits => &self.stock_units,
            Catalog::Suppliers => &self.suppliers,
        }
    }

    fn catalog_mut(&mut self, catalog: Catalog) -> &mut Vec<CatalogEntry> {
        match catalog {
            Catalog::ItemTypes => &mut self.item_types,
            Catalog::StockUnits => &mut self.stock_units,
            Catalog::Suppliers => &mut self.suppliers,
        }
    }

    fn name_of(&self, catalog: Catalog, id: i32) -> Option<String> {
        self.catalog(catalog)
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.clone())
    }

    fn check_reference(&self, catalog: Catalog, id: i32) -> StoreResult<()> {
        if self.catalog(catalog).iter().any(|entry| entry.id == id) {
            Ok(())
        } else {
            Err(StoreError::Constraint(format!(
                "{} has no row with id {}",
                catalog.table_name(),
                id
            )))
        }
    }

    fn joined(&self, row: &StoredItem) -> InventoryItem {
        InventoryItem {
            id: row.id,
            item_type: self.name_of(Catalog::ItemTypes, row.item_type_id),
            item_type_id: row.item_type_id,
            item_variant: row.item_variant.clone(),
            stock: row.stock,
            stock_unit: self.name_of(Catalog::StockUnits, row.stock_unit_id),
            stock_unit_id: row.stock_unit_id,
            supplier: self.name_of(Catalog::Suppliers, row.supplier_id),
            supplier_id: row.supplier_id,
            reorder_point: row.reorder_point,
            status: row.status,
            updated_at: row.updated_at,
        }
    }

    fn check_changes(&self, changes: &ItemChanges) -> StoreResult<()> {
        if let Some(id) = changes.item_type_id {
            self.check_reference(Catalog::ItemTypes, id)?;
        }
        if let Some(id) = changes.stock_unit_id {
            self.check_reference(Catalog::StockUnits, id)?;
        }
        if let Some(id) = changes.supplier_id {
            self.check_reference(Catalog::Suppliers, id)?;
        }
        Ok(())
    }
}

/// In-memory inventory store.
///
/// Intended for tests and local runs without a database. Catalog references are checked the
/// way the Postgres foreign keys would check them.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose catalogs hold the default seed rows.
    pub fn with_default_catalogs() -> Self {
        let store = Self::new();
        for catalog in Catalog::ALL {
            for name in catalog.default_entries() {
                // Fresh store, the lock cannot be poisoned yet.
                let _ = store.add_catalog_entry(catalog, name);
            }
        }
        store
    }

    /// Appends a catalog row, or returns the existing row with the same name.
    pub fn add_catalog_entry(&self, catalog: Catalog, name: &str) -> StoreResult<CatalogEntry> {
        let mut state = self.write()?;
        let entries = state.catalog_mut(catalog);
        if let Some(existing) = entries.iter().find(|entry| entry.name == name) {
            return Ok(existing.clone());
        }
        let entry = CatalogEntry {
            id: entries.iter().map(|entry| entry.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    fn diagnostic_hint(&self) -> &'static str {
        "In-memory store (DATABASE_URL not used)"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }

    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>> {
        let state = self.read()?;
        Ok(state.items.values().map(|row| state.joined(row)).collect())
    }

    async fn get_item(&self, id: i32) -> StoreResult<Option<InventoryItem>> {
        let state = self.read()?;
        Ok(state.items.get(&id).map(|row| state.joined(row)))
    }

    async fn insert_item(&self, item: &NewItem) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        state.check_reference(Catalog::ItemTypes, item.item_type_id)?;
        state.check_reference(Catalog::StockUnits, item.stock_unit_id)?;
        state.check_reference(Catalog::Suppliers, item.supplier_id)?;

        state.next_item_id += 1;
        let row = StoredItem {
            id: state.next_item_id,
            item_type_id: item.item_type_id,
            item_variant: item.item_variant.clone(),
            stock: item.stock,
            stock_unit_id: item.stock_unit_id,
            supplier_id: item.supplier_id,
            reorder_point: item.reorder_point,
            status: item.status,
            updated_at: Utc::now(),
        };
        let created = state.joined(&row);
        state.items.insert(row.id, row);
        Ok(created)
    }

    async fn update_item_with(&self, id: i32, plan: UpdatePlan) -> StoreResult<Option<InventoryItem>> {
        let mut state = self.write()?;
        let current = match state.items.get(&id) {
            Some(row) => state.joined(row),
            None => return Ok(None),
        };

        let changes = plan(&current);
        if changes.is_empty() {
            return Ok(Some(current));
        }
        state.check_changes(&changes)?;

        let Some(row) = state.items.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.item_type_id {
            row.item_type_id = v;
        }
        if let Some(v) = changes.item_variant {
            row.item_variant = v;
        }
        if let Some(v) = changes.stock {
            row.stock = v;
        }
        if let Some(v) = changes.stock_unit_id {
            row.stock_unit_id = v;
        }
        if let Some(v) = changes.supplier_id {
            row.supplier_id = v;
        }
        if let Some(v) = changes.reorder_point {
            row.reorder_point = v;
        }
        if let Some(v) = changes.status {
            row.status = v;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        Ok(Some(state.joined(&row)))
    }

    async fn delete_item(&self, id: i32) -> StoreResult<bool> {
        Ok(self.write()?.items.remove(&id).is_some())
    }

    async fn list_catalog(&self, catalog: Catalog) -> StoreResult<Vec<CatalogEntry>> {
        let mut entries = self.read()?.catalog(catalog).clone();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn dashboard_stats(&self, low_stock_fallback: f64) -> StoreResult<DashboardStats> {
        let items = self.list_items().await?;
        Ok(DashboardStats::from_items(&items, low_stock_fallback))
    }

    async fn raw_table(&self, table: RawTable) -> StoreResult<Vec<JsonValue>> {
        let state = self.read()?;
        let encode = |e: serde_json::Error| StoreError::Corrupt(e.to_string());
        match table {
            RawTable::InventoryItems => state
                .items
                .values()
                .map(|row| serde_json::to_value(row).map_err(encode))
                .collect(),
            RawTable::ItemTypes => raw_catalog(state.catalog(Catalog::ItemTypes)),
            RawTable::StockUnits => raw_catalog(state.catalog(Catalog::StockUnits)),
            RawTable::Suppliers => raw_catalog(state.catalog(Catalog::Suppliers)),
        }
    }
}

fn raw_catalog(entries: &[CatalogEntry]) -> StoreResult<Vec<JsonValue>> {
    let mut rows: Vec<&CatalogEntry> = entries.iter().collect();
    rows.sort_by_key(|entry| entry.id);
    rows.into_iter()
        .map(|entry| serde_json::to_value(entry).map_err(|e| StoreError::Corrupt(e.to_string())))
        .collect()
}
