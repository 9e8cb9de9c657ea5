//! Item status derivation.
//!
//! The stored status of an inventory item is recomputed from `(stock, reorder_point)` whenever
//! either changes. `Phased Out` is sticky, and `Phased Out` / `Restocking` can be forced through
//! an explicit manual override that bypasses recomputation for that single write.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Status persisted on every inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
pub enum ItemStatus {
    #[default]
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Restocking")]
    Restocking,
    #[serde(rename = "Phased Out")]
    PhasedOut,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 5] = [
        ItemStatus::Available,
        ItemStatus::LowStock,
        ItemStatus::OutOfStock,
        ItemStatus::Restocking,
        ItemStatus::PhasedOut,
    ];

    /// The exact string stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "Available",
            ItemStatus::LowStock => "Low Stock",
            ItemStatus::OutOfStock => "Out of Stock",
            ItemStatus::Restocking => "Restocking",
            ItemStatus::PhasedOut => "Phased Out",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown item status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ItemStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ItemStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Statuses a client may force regardless of stock levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ManualStatus {
    #[serde(rename = "Phased Out")]
    PhasedOut,
    #[serde(rename = "Restocking")]
    Restocking,
}

impl From<ManualStatus> for ItemStatus {
    fn from(value: ManualStatus) -> Self {
        match value {
            ManualStatus::PhasedOut => ItemStatus::PhasedOut,
            ManualStatus::Restocking => ItemStatus::Restocking,
        }
    }
}

impl TryFrom<ItemStatus> for ManualStatus {
    type Error = ItemStatus;

    fn try_from(value: ItemStatus) -> Result<Self, Self::Error> {
        match value {
            ItemStatus::PhasedOut => Ok(ManualStatus::PhasedOut),
            ItemStatus::Restocking => Ok(ManualStatus::Restocking),
            other => Err(other),
        }
    }
}

impl FromStr for ManualStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status: ItemStatus = s.parse()?;
        ManualStatus::try_from(status).map_err(|_| UnknownStatus(s.to_string()))
    }
}

/// What a single write says about the status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusWrite {
    /// The request did not mention status.
    #[default]
    Unspecified,
    /// The client sent a plain status value. It is a manual transition only when the stock
    /// levels are left alone; otherwise the recomputed status wins.
    Requested(ItemStatus),
    /// Stored as-is; the policy is not consulted.
    Override(ManualStatus),
}

impl StatusWrite {
    /// Builds the tagged input from the explicit override field and the legacy `status` field.
    ///
    /// A legacy `status` equal to `Phased Out` or `Restocking` is promoted to an override.
    pub fn from_request(status_override: Option<ManualStatus>, status: Option<ItemStatus>) -> Self {
        if let Some(manual) = status_override {
            return StatusWrite::Override(manual);
        }
        match status {
            Some(status) => match ManualStatus::try_from(status) {
                Ok(manual) => StatusWrite::Override(manual),
                Err(plain) => StatusWrite::Requested(plain),
            },
            None => StatusWrite::Unspecified,
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, StatusWrite::Unspecified)
    }
}

/// Stock level and threshold after a write has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockLevels {
    pub stock: f64,
    pub reorder_point: Option<i32>,
}

/// Clamps a stock quantity to a finite, non-negative value.
pub fn coerce_stock(stock: f64) -> f64 {
    if stock.is_finite() && stock > 0.0 {
        stock
    } else {
        0.0
    }
}

/// Derives the status that should be stored for the given stock level.
///
/// Total and pure: invalid stock values count as zero, and a phased-out item never
/// transitions automatically.
pub fn derive_status(stock: f64, reorder_point: Option<i32>, current: ItemStatus) -> ItemStatus {
    if current == ItemStatus::PhasedOut {
        return ItemStatus::PhasedOut;
    }

    let stock = coerce_stock(stock);
    if stock <= 0.0 {
        return ItemStatus::OutOfStock;
    }

    match reorder_point {
        Some(threshold) if stock <= f64::from(threshold) => ItemStatus::LowStock,
        _ => ItemStatus::Available,
    }
}

/// Status for a freshly created item.
pub fn initial_status(write: StatusWrite, levels: StockLevels) -> ItemStatus {
    match write {
        StatusWrite::Override(manual) => manual.into(),
        _ => derive_status(levels.stock, levels.reorder_point, ItemStatus::Available),
    }
}

/// Resolves the status column for an update.
///
/// `changed_levels` is `Some` when the write touched stock or reorder point and carries the
/// levels as they will be after the write. Returns `None` when the status column should be
/// left untouched.
pub fn resolve_write_status(
    current: ItemStatus,
    write: StatusWrite,
    changed_levels: Option<StockLevels>,
) -> Option<ItemStatus> {
    match (write, changed_levels) {
        (StatusWrite::Override(manual), _) => Some(manual.into()),
        (write, Some(levels)) => {
            let base = match write {
                StatusWrite::Requested(requested)
                    if current == ItemStatus::PhasedOut && requested != ItemStatus::PhasedOut =>
                {
                    requested
                }
                _ => current,
            };
            Some(derive_status(levels.stock, levels.reorder_point, base))
        }
        (StatusWrite::Requested(requested), None) => Some(requested),
        (StatusWrite::Unspecified, None) => None,
    }
}
