//! Connection configuration.

use std::env;
use std::time::Duration;

use mongodb::options::ClientOptions;

use crate::error::{RepositoryError, RepositoryResult};

/// Environment variable holding the connection URI.
pub const URI_ENV: &str = "MONGOWRAP_URI";

/// Environment variable holding the database name.
pub const DATABASE_ENV: &str = "MONGOWRAP_DATABASE";

const DEFAULT_URI: &str = "mongodb://localhost:27017";
const DEFAULT_APP_NAME: &str = "mongowrap";

/// Settings used to open a connection.
///
/// Pooling, timeouts and retries are all handled by the driver; these values
/// are only forwarded to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// MongoDB connection URI.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Application name (shown in server logs).
    pub app_name: Option<String>,
    /// Minimum connection pool size.
    pub min_pool_size: Option<u32>,
    /// Maximum connection pool size.
    pub max_pool_size: Option<u32>,
    /// Connection timeout.
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout.
    pub server_selection_timeout: Option<Duration>,
    /// Direct connection (bypass replica set discovery).
    pub direct_connection: Option<bool>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: String::new(),
            app_name: Some(DEFAULT_APP_NAME.to_string()),
            min_pool_size: None,
            max_pool_size: Some(10),
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            direct_connection: None,
        }
    }
}

impl ConnectionConfig {
    /// Create a configuration from a URI and database name.
    pub fn from_uri(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Read the URI and database name from `MONGOWRAP_URI` and
    /// `MONGOWRAP_DATABASE`.
    ///
    /// The URI falls back to a local server; the database name is required.
    pub fn from_env() -> RepositoryResult<Self> {
        let database = env::var(DATABASE_ENV)
            .map_err(|_| RepositoryError::config(format!("{} is not set", DATABASE_ENV)))?;
        let uri = env::var(URI_ENV).unwrap_or_else(|_| DEFAULT_URI.to_string());

        Self::builder().uri(uri).database(database).build()
    }

    /// Create a builder for configuration.
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new()
    }

    /// Convert to driver client options.
    pub async fn to_client_options(&self) -> RepositoryResult<ClientOptions> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| RepositoryError::config(format!("failed to parse URI: {}", e)))?;

        if let Some(ref app_name) = self.app_name {
            options.app_name = Some(app_name.clone());
        }

        if let Some(min_pool) = self.min_pool_size {
            options.min_pool_size = Some(min_pool);
        }

        if let Some(max_pool) = self.max_pool_size {
            options.max_pool_size = Some(max_pool);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            options.connect_timeout = Some(connect_timeout);
        }

        if let Some(selection_timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(selection_timeout);
        }

        if let Some(direct) = self.direct_connection {
            options.direct_connection = Some(direct);
        }

        Ok(options)
    }
}

/// Builder for [`ConnectionConfig`].
#[derive(Debug, Default)]
pub struct ConnectionConfigBuilder {
    uri: Option<String>,
    database: Option<String>,
    app_name: Option<String>,
    min_pool_size: Option<u32>,
    max_pool_size: Option<u32>,
    connect_timeout: Option<Duration>,
    server_selection_timeout: Option<Duration>,
    direct_connection: Option<bool>,
}

impl ConnectionConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the MongoDB URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Set the minimum pool size.
    pub fn min_pool_size(mut self, size: u32) -> Self {
        self.min_pool_size = Some(size);
        self
    }

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: u32) -> Self {
        self.max_pool_size = Some(size);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Set the server selection timeout.
    pub fn server_selection_timeout(mut self, duration: Duration) -> Self {
        self.server_selection_timeout = Some(duration);
        self
    }

    /// Enable direct connection.
    pub fn direct_connection(mut self, enabled: bool) -> Self {
        self.direct_connection = Some(enabled);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RepositoryResult<ConnectionConfig> {
        let database = self
            .database
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RepositoryError::config("database name is required"))?;

        let defaults = ConnectionConfig::default();

        Ok(ConnectionConfig {
            uri: self.uri.unwrap_or(defaults.uri),
            database,
            app_name: self.app_name.or(defaults.app_name),
            min_pool_size: self.min_pool_size,
            max_pool_size: self.max_pool_size.or(defaults.max_pool_size),
            connect_timeout: self.connect_timeout.or(defaults.connect_timeout),
            server_selection_timeout: self
                .server_selection_timeout
                .or(defaults.server_selection_timeout),
            direct_connection: self.direct_connection,
        })
    }
}
