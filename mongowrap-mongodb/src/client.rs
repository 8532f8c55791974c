//! Shared driver connection.

use std::sync::Arc;

use bson::doc;
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::{RepositoryError, RepositoryResult};

/// A handle on one MongoDB deployment and one database.
///
/// The driver pools connections and only opens sockets when an operation
/// needs one, so creating a `Connection` does no network I/O. Cloning is
/// cheap and shares the underlying pool.
#[derive(Clone)]
pub struct Connection {
    client: Client,
    database: Database,
    config: Arc<ConnectionConfig>,
}

impl Connection {
    /// Open a connection from configuration.
    pub async fn new(config: ConnectionConfig) -> RepositoryResult<Self> {
        let options = config.to_client_options().await?;

        let client = Client::with_options(options)
            .map_err(|e| RepositoryError::config(format!("failed to create client: {}", e)))?;

        let database = client.database(&config.database);

        info!(
            uri = %config.uri,
            database = %config.database,
            "MongoDB client created"
        );

        Ok(Self {
            client,
            database,
            config: Arc::new(config),
        })
    }

    /// Get a typed collection in the configured database.
    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.database.collection(name)
    }

    /// The configured database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Another database on the same deployment.
    pub fn get_database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// The underlying driver client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// The configuration this connection was opened with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Round-trip a `ping` command to the server.
    pub async fn ping(&self) -> RepositoryResult<()> {
        debug!(database = %self.config.database, "Pinging server");
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Whether the server answers a `ping`.
    pub async fn is_healthy(&self) -> bool {
        self.ping().await.is_ok()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("uri", &self.config.uri)
            .field("database", &self.config.database)
            .finish()
    }
}
