use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use qxweb_compare::{MemoryAddressBar, SelectionManager};
use qxweb_core::{Catalog, FeatureRegistry};

use crate::handlers;

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8090 }
    }
}

/// Shared application state passed to Axum handlers. One process serves
/// one simulated tab: the manager and address bar are shared singletons.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SelectionManager>,
    pub catalog: Arc<dyn Catalog>,
    pub address_bar: Arc<MemoryAddressBar>,
    pub registry: Arc<FeatureRegistry>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/companies", get(handlers::list_companies))
        .route("/companies/{id}", get(handlers::get_company))
        .route(
            "/compare/selection",
            get(handlers::get_selection).delete(handlers::clear_selection),
        )
        .route(
            "/compare/selection/{id}",
            post(handlers::add_to_selection).delete(handlers::remove_from_selection),
        )
        .route("/compare/navigate", post(handlers::navigate))
        .route("/compare/table", get(handlers::comparison_table))
        .route("/compare/share", get(handlers::share_link))
        .route("/compare/export.csv", get(handlers::export_csv))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Create and start the server. Returns a handle carrying the bound port.
pub async fn start(config: ServerConfig, state: AppState) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "qxweb server started");

    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        _server: server,
    })
}

/// Handle returned by `start()` — keeps the serve task alive.
pub struct ServerHandle {
    pub port: u16,
    _server: tokio::task::JoinHandle<()>,
}
