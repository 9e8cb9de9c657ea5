//! Lookup catalogs (item types, stock units, suppliers) and raw table names.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of a lookup catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntry {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    ItemTypes,
    StockUnits,
    Suppliers,
}

impl Catalog {
    pub const ALL: [Catalog; 3] = [Catalog::ItemTypes, Catalog::StockUnits, Catalog::Suppliers];

    pub fn table_name(&self) -> &'static str {
        match self {
            Catalog::ItemTypes => "item_types",
            Catalog::StockUnits => "stock_units",
            Catalog::Suppliers => "suppliers",
        }
    }

    /// Rows inserted when catalog seeding is enabled and the table is empty.
    pub fn default_entries(&self) -> &'static [&'static str] {
        match self {
            Catalog::ItemTypes => &["Fabric", "Thread", "Button", "Zipper", "Packaging"],
            Catalog::StockUnits => &["pcs", "m", "kg", "roll", "box"],
            Catalog::Suppliers => &["Default Supplier"],
        }
    }
}

/// Tables exposed through the raw database views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawTable {
    InventoryItems,
    ItemTypes,
    StockUnits,
    Suppliers,
}

impl RawTable {
    pub const ALL: [RawTable; 4] = [
        RawTable::InventoryItems,
        RawTable::ItemTypes,
        RawTable::StockUnits,
        RawTable::Suppliers,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            RawTable::InventoryItems => "inventory_items",
            RawTable::ItemTypes => Catalog::ItemTypes.table_name(),
            RawTable::StockUnits => Catalog::StockUnits.table_name(),
            RawTable::Suppliers => Catalog::Suppliers.table_name(),
        }
    }
}

impl From<Catalog> for RawTable {
    fn from(value: Catalog) -> Self {
        match value {
            Catalog::ItemTypes => RawTable::ItemTypes,
            Catalog::StockUnits => RawTable::StockUnits,
            Catalog::Suppliers => RawTable::Suppliers,
        }
    }
}
