//! Error types for repository operations.

use mongodb::error::{ErrorKind, WriteFailure};
use mongowrap_pipeline::ValidationError;
use thiserror::Error;
use tracing::warn;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Errors that can occur while talking to the document store.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The server could not be reached (selection timeout, I/O, DNS, auth).
    #[error("connection error: {0}")]
    Connection(#[source] mongodb::error::Error),

    /// The driver or server rejected the operation.
    #[error("store error: {0}")]
    Store(#[source] mongodb::error::Error),

    /// A pipeline argument failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Settings file could not be read.
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML or has unknown keys.
    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RepositoryError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a store error.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Check if the server rejected a write because of a unique index.
    pub fn is_duplicate_key(&self) -> bool {
        let Self::Store(err) = self else {
            return false;
        };

        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
            ErrorKind::BulkWrite(failure) => failure
                .write_errors
                .as_ref()
                .is_some_and(|errors| errors.iter().any(|e| e.code == DUPLICATE_KEY_CODE)),
            ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
            _ => false,
        }
    }
}

/// Whether a driver error means the server was never reached.
fn is_connectivity(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::Authentication { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
    )
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_connectivity(&err) {
            warn!(error = %err, "MongoDB server unreachable");
            Self::Connection(err)
        } else {
            Self::Store(err)
        }
    }
}
