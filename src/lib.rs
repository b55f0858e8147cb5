/// Public library interface for the habit streaks server
///
/// This module exports the main server implementation and public types
/// that can be used by other applications or tests.

use thiserror::Error;

pub mod analytics;
pub mod config;
pub mod domain;
pub mod mcp;
pub mod storage;
pub mod tools;

// Re-export public modules and types
pub use analytics::{StreakEngine, StreakError};
pub use config::{ConfigError, ServerConfig};
pub use domain::*;
pub use storage::{HabitStorage, LogStore, SqliteStorage, StorageError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main habit tracker server that implements the MCP protocol
///
/// Owns the storage for the lifetime of the process; every request borrows
/// it.
pub struct HabitTrackerServer {
    storage: SqliteStorage,
    config: ServerConfig,
}

impl HabitTrackerServer {
    /// Create a new habit tracker server from its configuration
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing habit tracker server with database: {:?}", config.database_path);

        config::prepare_database_path(&config.database_path)?;
        let storage = SqliteStorage::new(config.database_path.clone())?;

        Ok(Self::with_storage(storage, config))
    }

    /// Build a server around storage that is already open
    pub fn with_storage(storage: SqliteStorage, config: ServerConfig) -> Self {
        Self { storage, config }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        // Test database connectivity
        let habits = self.storage.list_habits(None)?;
        tracing::info!("Server started successfully, found {} existing habits", habits.len());

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// A streak engine over this server's storage, using the configured policy
    pub fn streak_engine(&self) -> StreakEngine<'_, SqliteStorage> {
        StreakEngine::new(&self.storage).with_policy(self.config.longest_streak_policy)
    }
}
