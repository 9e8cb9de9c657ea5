use crate::domain::{CatalogEntry, DashboardStats, InventoryItem, ItemStatus};
use crate::transport::http::handlers::common::api_not_found_handler;
use crate::transport::http::handlers::{catalog, dashboard, db_view, events, health, inventory};
use crate::transport::http::types::{
    ApiResponse, AppState, CreateItemRequest, ReduceStockRequest, UpdateItemRequest,
};
use axum::routing::{get, put};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        events::events_handler,
        inventory::list_items_handler,
        inventory::get_item_handler,
        inventory::create_item_handler,
        inventory::update_item_handler,
        inventory::reduce_stock_handler,
        inventory::phase_out_handler,
        inventory::delete_item_handler,
        catalog::item_types_handler,
        catalog::stock_units_handler,
        catalog::suppliers_handler,
        dashboard::dashboard_handler,
        db_view::raw_inventory_items_handler,
        db_view::raw_item_types_handler,
        db_view::raw_stock_units_handler,
        db_view::raw_suppliers_handler,
        db_view::raw_all_handler
    ),
    components(schemas(
        ApiResponse,
        InventoryItem,
        ItemStatus,
        CatalogEntry,
        DashboardStats,
        CreateItemRequest,
        UpdateItemRequest,
        ReduceStockRequest
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/inventory",
            get(inventory::list_items_handler).post(inventory::create_item_handler),
        )
        .route(
            "/inventory/:id",
            get(inventory::get_item_handler)
                .put(inventory::update_item_handler)
                .delete(inventory::delete_item_handler),
        )
        .route("/inventory/:id/reduce-stock", put(inventory::reduce_stock_handler))
        .route("/inventory/:id/phase-out", put(inventory::phase_out_handler))
        .route("/item-types", get(catalog::item_types_handler))
        .route("/stock-units", get(catalog::stock_units_handler))
        .route("/suppliers", get(catalog::suppliers_handler))
        .route("/dashboard", get(dashboard::dashboard_handler))
        .route("/db/inventory-items", get(db_view::raw_inventory_items_handler))
        .route("/db/item-types", get(db_view::raw_item_types_handler))
        .route("/db/stock-units", get(db_view::raw_stock_units_handler))
        .route("/db/suppliers", get(db_view::raw_suppliers_handler))
        .route("/db/all", get(db_view::raw_all_handler))
        // Unknown API paths never reach the frontend fallback.
        .fallback(api_not_found_handler);

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/events", get(events::events_handler))
        .nest("/api", api)
        .with_state(app_state)
}
