//! Application state - shared across all handlers.

use std::sync::Arc;

use inkpost_core::ports::{PostRepository, UserRepository};
use inkpost_infra::database::{DatabaseConfig, DatabaseConnections};
use inkpost_infra::database::{PostgresPostRepository, PostgresUserRepository};
use inkpost_infra::memory::{InMemoryPostRepository, InMemoryUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Falls back to the in-memory repositories when no database is
    /// configured or the connection fails.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        if let Some(config) = db_config {
            match DatabaseConnections::init(config).await {
                Ok(connections) => {
                    let conn = Arc::new(connections);
                    let state = Self {
                        users: Arc::new(PostgresUserRepository::new(conn.main.clone())),
                        posts: Arc::new(PostgresPostRepository::new(conn.main.clone())),
                        db: Some(conn),
                    };
                    tracing::info!("Application state initialized (postgres)");
                    return state;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            db: None,
        }
    }
}
