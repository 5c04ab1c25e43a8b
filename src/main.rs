//! Contacts Server
//!
//! A Rust REST API server for contact management.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contacts_server::{
    api,
    config::{AppConfig, StorageBackend},
    db::{self, ConnectionHolder},
    repository::{ContactStore, InMemoryContactStore, MongoContactStore},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_filter().into());
    let json_logs = config.logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting Contacts Server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn ContactStore> = match config.database.backend {
        StorageBackend::Mongodb => {
            let holder = ConnectionHolder::new();
            holder
                .initialize(|| db::connect(&config.database))
                .await
                .context("Failed to connect to the database")?;
            let database = holder.handle()?;
            Arc::new(MongoContactStore::new(&database, &config.database.collection))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; contacts are lost on shutdown");
            Arc::new(InMemoryContactStore::new())
        }
    };

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(Services::new(store)),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
