//! HTTP search server
//!
//! Serves ranked search results and page details for every configured
//! partition:
//! - `GET /health`
//! - `GET /{partition}?q=&boost=&limit=&format=`
//! - `GET /page-data/{partition}/{url}`
//!
//! Each partition's text index is built once when the state is created;
//! page details are read from storage on every request.

pub mod beacon;
mod error;
pub mod handlers;
pub mod render;

pub use error::ApiError;

use crate::config::Config;
use crate::search::PartitionSearch;
use crate::storage::{self, SqliteStorage, StorageResult};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    storage: Arc<Mutex<SqliteStorage>>,
    indexes: Arc<HashMap<String, Arc<PartitionSearch>>>,
}

impl AppState {
    /// Loads and indexes every named partition
    pub fn new(storage: Arc<Mutex<SqliteStorage>>, partitions: &[String]) -> StorageResult<Self> {
        let mut indexes = HashMap::new();
        {
            let guard = storage::lock(&storage);
            for name in partitions {
                let search = PartitionSearch::load(&*guard, name)?;
                tracing::info!("Indexed {} pages for '{}'", search.page_count(), name);
                indexes.insert(name.clone(), Arc::new(search));
            }
        }

        Ok(Self {
            storage,
            indexes: Arc::new(indexes),
        })
    }

    pub fn search_index(&self, partition: &str) -> Option<Arc<PartitionSearch>> {
        self.indexes.get(partition).cloned()
    }

    pub fn storage(&self) -> Arc<Mutex<SqliteStorage>> {
        Arc::clone(&self.storage)
    }
}

/// Builds the router with request tracing
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/page-data/{partition}/{url}", get(handlers::page_data))
        .route("/{partition}", get(handlers::search))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .with_state(state)
}

/// Binds, announces and serves until Ctrl-C
pub async fn serve(config: &Config, storage: Arc<Mutex<SqliteStorage>>) -> crate::Result<()> {
    let state = AppState::new(storage, &config.partition_names())?;
    let app = create_router(state);

    let addr: SocketAddr = config.server.bind_address.parse().map_err(|e| {
        crate::ConfigError::Validation(format!(
            "Invalid bind address '{}': {}",
            config.server.bind_address, e
        ))
    })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Search server listening on http://{}", addr);

    if let (Some(directory), Some(public)) = (
        config.server.directory_url.clone(),
        config.server.public_address.clone(),
    ) {
        tokio::spawn(async move {
            beacon::announce(&directory, &public).await;
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Search server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
