//! Database connection lifecycle
//!
//! The server opens exactly one MongoDB connection for its whole lifetime.
//! `ConnectionHolder` owns that handle: the first `initialize` runs the
//! connect routine, later calls hand back the stored handle, and concurrent
//! first calls share a single connection attempt.

use std::{fmt::Display, future::Future};

use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use tokio::sync::OnceCell;

use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
};

pub struct ConnectionHolder<H> {
    handle: OnceCell<H>,
}

impl<H: Clone> ConnectionHolder<H> {
    pub fn new() -> Self {
        Self {
            handle: OnceCell::new(),
        }
    }

    /// Run `connect` unless a handle already exists, and return the handle.
    ///
    /// A failed attempt stores nothing, so a later call tries again.
    pub async fn initialize<F, Fut, E>(&self, connect: F) -> Result<H, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<H, E>>,
        E: Display,
    {
        if let Some(handle) = self.handle.get() {
            tracing::info!("Database is already initialized");
            return Ok(handle.clone());
        }

        let handle = self
            .handle
            .get_or_try_init(|| async {
                match connect().await {
                    Ok(handle) => {
                        tracing::info!("Database connected successfully");
                        Ok(handle)
                    }
                    Err(e) => {
                        tracing::error!("Failed to connect to the database: {}", e);
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(handle.clone())
    }

    /// The stored handle; fails if `initialize` has not succeeded yet
    pub fn handle(&self) -> AppResult<H> {
        self.handle.get().cloned().ok_or(AppError::Uninitialized)
    }
}

impl<H: Clone> Default for ConnectionHolder<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the MongoDB database named by the connection string.
///
/// Falls back to `config.name` when the URI carries no database path, and
/// pings the server so an unreachable database fails here rather than on the
/// first request.
pub async fn connect(config: &DatabaseConfig) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&config.url).await?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

    let client = Client::with_options(options)?;
    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(&config.name));

    database.run_command(doc! { "ping": 1 }, None).await?;
    tracing::debug!("Using database {}", database.name());

    Ok(database)
}
