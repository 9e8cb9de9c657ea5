use crate::domain::status::ItemStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inventory item as returned by the API, joined with its catalog names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InventoryItem {
    pub id: i32,
    pub item_type: Option<String>,
    pub item_type_id: i32,
    pub item_variant: String,
    pub stock: f64,
    pub stock_unit: Option<String>,
    pub stock_unit_id: i32,
    pub supplier: Option<String>,
    pub supplier_id: i32,
    pub reorder_point: Option<i32>,
    pub status: ItemStatus,
    pub updated_at: DateTime<Utc>,
}

/// A validated row ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub item_type_id: i32,
    pub item_variant: String,
    pub stock: f64,
    pub stock_unit_id: i32,
    pub supplier_id: i32,
    pub reorder_point: Option<i32>,
    pub status: ItemStatus,
}

/// Column changes for a single update. `None` leaves the column untouched.
///
/// `reorder_point` is doubly optional: `Some(None)` clears the threshold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemChanges {
    pub item_type_id: Option<i32>,
    pub item_variant: Option<String>,
    pub stock: Option<f64>,
    pub stock_unit_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub reorder_point: Option<Option<i32>>,
    pub status: Option<ItemStatus>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.item_type_id.is_none()
            && self.item_variant.is_none()
            && self.stock.is_none()
            && self.stock_unit_id.is_none()
            && self.supplier_id.is_none()
            && self.reorder_point.is_none()
            && self.status.is_none()
    }
}
