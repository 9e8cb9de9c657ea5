use crate::domain::DashboardStats;
use crate::transport::http::handlers::common::ApiResult;
use crate::transport::http::types::AppState;
use axum::extract::State;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Aggregate counts, excluding phased-out items", body = DashboardStats),
        (status = 500, description = "Database error", body = crate::transport::http::types::ApiResponse)
    )
)]
pub async fn dashboard_handler(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.inventory.dashboard().await?))
}
