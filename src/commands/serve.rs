//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Initialize database (runs pending migrations)
    let db = Arc::new(Database::connect(&config).await);
    tracing::info!("Database connected");

    // Root cancellation token; cancelled on shutdown so in-flight
    // repository operations abort instead of blocking the drain
    let shutdown = CancellationToken::new();

    // Create application state with explicitly injected dependencies
    let app_state = AppState::from_database(db, shutdown.clone());

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Wait for SIGINT, then cancel the root token
async fn wait_for_shutdown(shutdown: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received, cancelling in-flight requests");
    }
    shutdown.cancel();
}
