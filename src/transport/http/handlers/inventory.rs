use crate::app::inventory_service::{CreateItemInput, UpdateItemInput};
use crate::domain::InventoryItem;
use crate::transport::http::handlers::common::{parse_item_id, ApiError, ApiResult};
use crate::transport::http::types::{
    invalid_json_message, AppState, CreateItemRequest, ReduceStockRequest,
    UpdateItemRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "All items, joined with catalog names", body = [InventoryItem]),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn list_items_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<InventoryItem>>> {
    Ok(Json(state.inventory.list_items().await?))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "The item", body = InventoryItem),
        (status = 400, description = "Invalid id", body = crate::transport::http::types::ApiResponse),
        (status = 404, description = "Item not found", body = crate::transport::http::types::ApiResponse),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<InventoryItem>> {
    let id = parse_item_id(&id)?;
    Ok(Json(state.inventory.get_item(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = InventoryItem),
        (status = 400, description = "Missing or invalid fields", body = crate::transport::http::types::ApiResponse),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn create_item_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateItemRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = request.map_err(|e| {
        ApiError::BadRequest(invalid_json_message(
            &e,
            "{\"item_type_id\", \"item_variant\", \"stock\", \"stock_unit_id\", \"supplier_id\"}",
        ))
    })?;
    let input = CreateItemInput::try_from(request)?;
    let created = state.inventory.create_item(input).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    params(("id" = i32, Path, description = "Item id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = InventoryItem),
        (status = 400, description = "No fields to update, or invalid fields", body = crate::transport::http::types::ApiResponse),
        (status = 404, description = "Item not found", body = crate::transport::http::types::ApiResponse),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> ApiResult<Json<InventoryItem>> {
    let id = parse_item_id(&id)?;
    let Json(request) = request
        .map_err(|e| ApiError::BadRequest(invalid_json_message(&e, "an object of item fields")))?;
    let input = UpdateItemInput::try_from(request)?;
    Ok(Json(state.inventory.update_item(id, input).await?))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}/reduce-stock",
    params(("id" = i32, Path, description = "Item id")),
    request_body = ReduceStockRequest,
    responses(
        (status = 200, description = "Stock reduced (floored at zero)", body = InventoryItem),
        (status = 400, description = "Invalid reduce amount", body = crate::transport::http::types::ApiResponse),
        (status = 404, description = "Item not found", body = crate::transport::http::types::ApiResponse),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn reduce_stock_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<ReduceStockRequest>, JsonRejection>,
) -> ApiResult<Json<InventoryItem>> {
    let id = parse_item_id(&id)?;
    let Json(request) = request
        .map_err(|e| ApiError::BadRequest(invalid_json_message(&e, "{\"reduceAmount\": n}")))?;
    let amount = request.amount()?;
    Ok(Json(state.inventory.reduce_stock(id, amount).await?))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}/phase-out",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item phased out", body = InventoryItem),
        (status = 404, description = "Item not found", body = crate::transport::http::types::ApiResponse),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn phase_out_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<InventoryItem>> {
    let id = parse_item_id(&id)?;
    Ok(Json(state.inventory.phase_out(id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = crate::transport::http::types::ApiResponse),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_item_id(&id)?;
    state.inventory.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
