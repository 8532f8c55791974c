//! Settings file support (`mongowrap.toml`).
//!
//! ```toml
//! [mongodb]
//! uri = "${MONGOWRAP_URI}"
//! database = "app"
//! app_name = "billing"
//! max_pool_size = 20
//! connect_timeout_ms = 5000
//! ```
//!
//! `${VAR}` placeholders are replaced from the environment before parsing.
//! Unset variables are left as written.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::{RepositoryError, RepositoryResult};

/// Default settings file name.
pub const SETTINGS_FILE: &str = "mongowrap.toml";

/// Top-level settings file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Connection settings.
    #[serde(default)]
    pub mongodb: MongoSettings,
}

/// The `[mongodb]` table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MongoSettings {
    /// Connection URI.
    pub uri: Option<String>,
    /// Database name.
    pub database: Option<String>,
    /// Application name.
    pub app_name: Option<String>,
    /// Minimum pool size.
    pub min_pool_size: Option<u32>,
    /// Maximum pool size.
    pub max_pool_size: Option<u32>,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
    /// Server selection timeout in milliseconds.
    pub server_selection_timeout_ms: Option<u64>,
    /// Bypass replica set discovery.
    pub direct_connection: Option<bool>,
}

impl Settings {
    /// Load `mongowrap.toml` from the current directory.
    pub fn load() -> RepositoryResult<Self> {
        Self::from_file(SETTINGS_FILE)
    }

    /// Load settings from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RepositoryError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        debug!(path = %path.display(), "Loaded settings file");
        Self::from_str(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_str(content: &str) -> RepositoryResult<Self> {
        let expanded = expand_env_vars(content);
        Ok(toml::from_str(&expanded)?)
    }

    /// Turn the settings into a connection configuration.
    pub fn into_config(self) -> RepositoryResult<ConnectionConfig> {
        let mongo = self.mongodb;
        let mut builder = ConnectionConfig::builder();

        if let Some(uri) = mongo.uri {
            builder = builder.uri(uri);
        }
        if let Some(database) = mongo.database {
            builder = builder.database(database);
        }
        if let Some(app_name) = mongo.app_name {
            builder = builder.app_name(app_name);
        }
        if let Some(size) = mongo.min_pool_size {
            builder = builder.min_pool_size(size);
        }
        if let Some(size) = mongo.max_pool_size {
            builder = builder.max_pool_size(size);
        }
        if let Some(ms) = mongo.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = mongo.server_selection_timeout_ms {
            builder = builder.server_selection_timeout(Duration::from_millis(ms));
        }
        if let Some(direct) = mongo.direct_connection {
            builder = builder.direct_connection(direct);
        }

        builder.build()
    }
}

/// Expand environment variables in the format `${VAR_NAME}`.
fn expand_env_vars(content: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder pattern");

    re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
