//! Domain types: items, catalogs, dashboard aggregates and the status policy.

pub mod catalog;
pub mod dashboard;
pub mod item;
pub mod status;

pub use catalog::{Catalog, CatalogEntry, RawTable};
pub use dashboard::{is_low_stock, DashboardStats, DEFAULT_LOW_STOCK_FALLBACK};
pub use item::{InventoryItem, ItemChanges, NewItem};
pub use status::{
    derive_status, initial_status, resolve_write_status, ItemStatus, ManualStatus, StatusWrite,
    StockLevels,
};
