use std::path::PathBuf;
use std::sync::Arc;

use qxweb_compare::{MemoryAddressBar, SelectionManager};
use qxweb_core::{FeatureRegistry, InMemoryCatalog};
use qxweb_store::{Database, DurableStore, MemoryStore};
use qxweb_telemetry::LoggingConfig;

const SEED_CATALOG: &str = include_str!("../demos/companies.json");

#[tokio::main]
async fn main() {
    qxweb_telemetry::init_logging(&LoggingConfig::default());

    tracing::info!("Starting QX Web comparison server");

    let catalog = load_catalog();
    tracing::info!(companies = catalog.len(), "catalog loaded");
    let catalog = Arc::new(catalog);

    // A failed database open degrades to an in-memory session rather than
    // aborting: the selection just stops surviving restarts.
    let db_path = dirs_home().join(".qxweb").join("database").join("compare.db");
    let store: Arc<dyn DurableStore> = match Database::open(&db_path) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::warn!(error = %e, "database unavailable; selection will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let origin = std::env::var("QXWEB_ORIGIN")
        .ok()
        .and_then(|raw| url::Url::parse(&raw).ok())
        .unwrap_or_else(|| url::Url::parse("https://qx.net.au").expect("static origin"));

    let address_bar = Arc::new(MemoryAddressBar::new());
    let manager = Arc::new(SelectionManager::new(
        catalog.clone(),
        store,
        address_bar.clone(),
        origin,
    ));

    let state = qxweb_server::AppState {
        manager,
        catalog,
        address_bar,
        registry: Arc::new(FeatureRegistry::standard()),
    };

    let config = qxweb_server::ServerConfig::default();
    let port = config.port;
    let _handle = qxweb_server::start(config, state)
        .await
        .expect("Failed to start server");

    tracing::info!(port = port, "QX Web server ready");

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");

    tracing::info!("Shutting down");
}

fn load_catalog() -> InMemoryCatalog {
    if let Ok(path) = std::env::var("QXWEB_CATALOG") {
        match std::fs::read_to_string(&path) {
            Ok(json) => match InMemoryCatalog::from_json(&json) {
                Ok(catalog) => return catalog,
                Err(e) => tracing::warn!(path, error = %e, "catalog file unreadable; using seed"),
            },
            Err(e) => tracing::warn!(path, error = %e, "catalog file missing; using seed"),
        }
    }
    InMemoryCatalog::from_json(SEED_CATALOG).expect("seed catalog parses")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
