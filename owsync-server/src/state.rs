//! Application state shared across all request handlers.

use crate::config::runtime::RuntimeConfig;
use owsync_core::processors::WalletIngestionService;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// The ingestion service (swapped wholesale on SIGHUP reload).
    ingestion: Arc<RwLock<Arc<WalletIngestionService>>>,
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: Arc<RwLock<RuntimeConfig>>,
}

impl AppState {
    /// Create a new AppState with the given pool, service and configuration.
    pub fn new(db: PgPool, ingestion: Arc<WalletIngestionService>, config: RuntimeConfig) -> Self {
        Self {
            db,
            ingestion: Arc::new(RwLock::new(ingestion)),
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Get the current ingestion service.
    pub async fn ingestion(&self) -> Arc<WalletIngestionService> {
        self.ingestion.read().await.clone()
    }

    /// Swap the ingestion service (used during SIGHUP reload).
    pub async fn swap_ingestion(&self, service: Arc<WalletIngestionService>) {
        let mut guard = self.ingestion.write().await;
        *guard = service;
    }

    /// Update the configuration (used during SIGHUP reload).
    pub async fn update_config(&self, new_config: RuntimeConfig) {
        let mut config = self.config.write().await;
        *config = new_config;
    }
}
