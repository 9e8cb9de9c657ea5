//! Raw table views, for inspecting what is actually stored.

use crate::domain::RawTable;
use crate::transport::http::handlers::common::ApiResult;
use crate::transport::http::types::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::Value as JsonValue;

async fn raw_rows(state: &AppState, table: RawTable) -> ApiResult<Json<Vec<JsonValue>>> {
    Ok(Json(state.inventory.raw_table(table).await?))
}

#[utoipa::path(
    get,
    path = "/api/db/inventory-items",
    responses(
        (status = 200, description = "Raw inventory_items rows ordered by id", body = [serde_json::Value]),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn raw_inventory_items_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<JsonValue>>> {
    raw_rows(&state, RawTable::InventoryItems).await
}

#[utoipa::path(
    get,
    path = "/api/db/item-types",
    responses(
        (status = 200, description = "Raw item_types rows ordered by id", body = [serde_json::Value]),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn raw_item_types_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<JsonValue>>> {
    raw_rows(&state, RawTable::ItemTypes).await
}

#[utoipa::path(
    get,
    path = "/api/db/stock-units",
    responses(
        (status = 200, description = "Raw stock_units rows ordered by id", body = [serde_json::Value]),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn raw_stock_units_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<JsonValue>>> {
    raw_rows(&state, RawTable::StockUnits).await
}

#[utoipa::path(
    get,
    path = "/api/db/suppliers",
    responses(
        (status = 200, description = "Raw suppliers rows ordered by id", body = [serde_json::Value]),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn raw_suppliers_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<JsonValue>>> {
    raw_rows(&state, RawTable::Suppliers).await
}

#[utoipa::path(
    get,
    path = "/api/db/all",
    responses(
        (status = 200, description = "All raw tables keyed by table name", body = serde_json::Value),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn raw_all_handler(State(state): State<AppState>) -> ApiResult<Json<JsonValue>> {
    Ok(Json(state.inventory.raw_all().await?))
}
