use crate::app::change_notifier::ChangeNotifier;
use crate::app::inventory_service::InventoryService;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<InventoryService>,
    pub notifier: ChangeNotifier,
}

impl AppState {
    pub fn new(inventory: Arc<InventoryService>) -> Self {
        let notifier = inventory.notifier().clone();
        Self {
            inventory,
            notifier,
        }
    }
}

/// Envelope for error bodies and health checks.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Keeps an explicit JSON `null` distinguishable from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/inventory`.
///
/// Numeric fields accept numbers or numeric strings.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateItemRequest {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = i32)]
    pub item_type_id: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String)]
    pub item_variant: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = f64)]
    pub stock: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = i32)]
    pub stock_unit_id: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = i32)]
    pub supplier_id: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub reorder_point: Option<JsonValue>,
    /// Legacy status field; only `Phased Out` and `Restocking` are honored as overrides.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub status: Option<JsonValue>,
    /// Explicit manual status: `Phased Out` or `Restocking`.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub status_override: Option<JsonValue>,
}

/// Body of `PUT /api/inventory/{id}`. Every field is optional; `reorder_point: null` clears
/// the threshold.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct UpdateItemRequest {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub item_type_id: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub item_variant: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<f64>)]
    pub stock: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub stock_unit_id: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub supplier_id: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub reorder_point: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub status: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub status_override: Option<JsonValue>,
}

/// Body of `PUT /api/inventory/{id}/reduce-stock`.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct ReduceStockRequest {
    #[serde(default, rename = "reduceAmount", alias = "reduce_amount")]
    #[schema(value_type = f64)]
    pub reduce_amount: Option<JsonValue>,
}

pub fn invalid_json_message(err: &JsonRejection, expected: &str) -> String {
    format!("Invalid JSON body: {} (expected: {})", err, expected)
}
