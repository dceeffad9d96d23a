//! HTTP API server for the text-matching service.

pub mod routes;

use crate::metrics::MetricsCollector;
use crate::store::EmbeddingStore;
use std::sync::{Arc, RwLock};

/// Shared application state for the HTTP server.
///
/// The store sits behind a single RwLock: mutating handlers take the
/// write lock for the full read-modify-persist sequence, read handlers
/// may run concurrently with each other but not with a mutation.
pub struct AppState {
    pub store: RwLock<EmbeddingStore>,
    pub metrics: RwLock<MetricsCollector>,
}

impl AppState {
    pub fn new(store: EmbeddingStore) -> Self {
        Self {
            store: RwLock::new(store),
            metrics: RwLock::new(MetricsCollector::new()),
        }
    }
}

/// Start the HTTP server over the given store.
pub async fn start(addr: &str, store: EmbeddingStore) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(store));

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
