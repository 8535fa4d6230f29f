//! Application state - shared across all handlers.

use quill_core::ports::ContentStore;
use quill_infra::{DatabaseConfig, InMemoryStore};

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConnections;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: ContentStore,
    /// Which backend `store` runs on, reported by the health check.
    pub backend: &'static str,
}

impl AppState {
    /// Wrap an already assembled content store.
    pub fn with_store(store: ContentStore, backend: &'static str) -> Self {
        Self { store, backend }
    }

    /// State over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::with_store(InMemoryStore::content_store(), "memory")
    }

    /// Build the application state, falling back to memory when the database is unusable.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let state = match db_config {
            Some(config) => match DatabaseConnections::init(config).await {
                Ok(connections) => Self::with_store(
                    quill_infra::database::content_store(connections.main),
                    "postgres",
                ),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            if db_config.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            Self::in_memory()
        };

        tracing::info!(backend = state.backend, "Application state initialized");
        state
    }
}
