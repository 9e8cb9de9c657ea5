//! Hosting of the single-page frontend build.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

pub const MISSING_BUILD_MESSAGE: &str =
    "Frontend build not found. Please build the React app first.";

/// Serves static files from `build_dir`, answering unknown paths with `index.html` (200) so
/// client-side routes resolve. Without a build, unknown paths get a JSON 404.
///
/// Only paths the router does not match reach this; `/api/*` has its own JSON 404.
pub fn with_frontend(router: Router, build_dir: &Path) -> Router {
    let index = build_dir.join("index.html");
    if index.is_file() {
        tracing::info!(dir = %build_dir.display(), "serving frontend build");
        router.fallback_service(ServeDir::new(build_dir).fallback(ServeFile::new(index)))
    } else {
        tracing::warn!(dir = %build_dir.display(), "frontend build not found");
        router.fallback(missing_build_handler)
    }
}

async fn missing_build_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": MISSING_BUILD_MESSAGE })),
    )
}
