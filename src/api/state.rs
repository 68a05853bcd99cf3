//! Application state - Dependency injection container.
//!
//! Every dependency is passed in explicitly at startup; no layer reaches
//! for an ambient global.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::infra::{Database, PgUserRepository};
use crate::services::{UserManager, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Database connection
    pub database: Arc<Database>,
    /// Root cancellation token; handlers derive per-request child tokens
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create application state from a live database connection.
    ///
    /// Wires the repository and service over the injected connection;
    /// this is the production construction path.
    pub fn from_database(database: Arc<Database>, shutdown: CancellationToken) -> Self {
        let repo = Arc::new(PgUserRepository::new(database.get_connection()));
        let user_service = Arc::new(UserManager::new(repo));

        Self {
            user_service,
            database,
            shutdown,
        }
    }

    /// Create application state with manually injected services (tests).
    pub fn new(
        user_service: Arc<dyn UserService>,
        database: Arc<Database>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            user_service,
            database,
            shutdown,
        }
    }
}
