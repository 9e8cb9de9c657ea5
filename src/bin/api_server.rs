// src/bin/api_server.rs

use operix_inventory::infra::{observability, AppConfig};
use operix_inventory::transport;
use operix_inventory::{ChangeNotifier, InventoryService, PostgresInventoryStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    observability::init(config.log_format);

    // --- Store Initialization ---
    tracing::info!(max_connections = config.db_max_connections, "connecting to Postgres");
    let store = PostgresInventoryStore::connect(&config.database_url, config.db_max_connections).await?;
    store.ensure_schema().await?;
    if config.seed_catalogs {
        store.seed_catalogs().await?;
        tracing::info!("default catalogs seeded");
    }

    // --- Service Initialization ---
    let notifier = ChangeNotifier::new(config.keep_alive);
    let inventory = Arc::new(InventoryService::new(
        Arc::new(store),
        notifier,
        config.low_stock_fallback,
    ));
    let app_state = transport::http::AppState::new(inventory);

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()));
    let app = transport::http::with_frontend(app, &config.frontend_build_dir).layer(cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API server listening");
    tracing::info!("Swagger UI available at http://localhost:{}/swagger-ui", config.port);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
