//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{MockChatAdapter, PgDocumentStore},
    build_router,
    config::Config,
    error::ApiError,
    web::state::AppState,
};
use slate_core::{memory::InMemoryStore, ports::DocumentStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Document Store ---
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(database_url) => {
            info!("Opening document store...");
            let pg_store = PgDocumentStore::open(
                database_url,
                config.db_max_connections,
                config.store_timeout,
            )?;
            // An unreachable database is not fatal: reads degrade to demo data,
            // and the schema is applied on first use once it comes back.
            if let Err(e) = pg_store.ensure_schema().await {
                warn!("Database not ready, deferring migrations: {}", e);
            }
            Arc::new(pg_store)
        }
        None => {
            warn!("DATABASE_URL is not set; serving demo data only.");
            Arc::new(InMemoryStore::closed())
        }
    };

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        store.clone(),
        Arc::new(MockChatAdapter::new()),
        config.clone(),
    ));
    let app = build_router(app_state);

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped. Closing document store...");
    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
