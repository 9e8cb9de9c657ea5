//! Lookup catalogs for the form dropdowns.

use crate::domain::{Catalog, CatalogEntry};
use crate::transport::http::handlers::common::ApiResult;
use crate::transport::http::types::AppState;
use axum::extract::State;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/item-types",
    responses(
        (status = 200, description = "Item types ordered by name", body = [CatalogEntry]),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn item_types_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<CatalogEntry>>> {
    Ok(Json(state.inventory.catalog(Catalog::ItemTypes).await?))
}

#[utoipa::path(
    get,
    path = "/api/stock-units",
    responses(
        (status = 200, description = "Stock units ordered by name", body = [CatalogEntry]),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn stock_units_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<CatalogEntry>>> {
    Ok(Json(state.inventory.catalog(Catalog::StockUnits).await?))
}

#[utoipa::path(
    get,
    path = "/api/suppliers",
    responses(
        (status = 200, description = "Suppliers ordered by name", body = [CatalogEntry]),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn suppliers_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<CatalogEntry>>> {
    Ok(Json(state.inventory.catalog(Catalog::Suppliers).await?))
}
