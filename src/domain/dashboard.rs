use crate::domain::item::InventoryItem;
use crate::domain::status::ItemStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Threshold used by the dashboard for items without a reorder point.
pub const DEFAULT_LOW_STOCK_FALLBACK: f64 = 10.0;

/// Aggregate counts shown on the dashboard. Phased-out items are excluded from every total
/// except `phased_out`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_items: i64,
    pub low_stock: i64,
    pub total_stock: f64,
    pub phased_out: i64,
}

impl DashboardStats {
    pub fn from_items<'a, I>(items: I, low_stock_fallback: f64) -> Self
    where
        I: IntoIterator<Item = &'a InventoryItem>,
    {
        let mut stats = DashboardStats::default();
        for item in items {
            if item.status == ItemStatus::PhasedOut {
                stats.phased_out += 1;
                continue;
            }
            stats.total_items += 1;
            stats.total_stock += item.stock;
            if is_low_stock(item.stock, item.reorder_point, low_stock_fallback) {
                stats.low_stock += 1;
            }
        }
        stats
    }
}

/// Dashboard notion of "low": at or below the reorder point, or under the fallback threshold
/// when the item has none. Out-of-stock items count as low.
pub fn is_low_stock(stock: f64, reorder_point: Option<i32>, fallback: f64) -> bool {
    match reorder_point {
        Some(threshold) => stock <= f64::from(threshold),
        None => stock < fallback,
    }
}
