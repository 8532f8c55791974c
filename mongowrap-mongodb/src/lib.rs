//! # mongowrap-mongodb
//!
//! A repository facade over the official MongoDB driver.
//!
//! This crate provides:
//! - `Repository<T>`: create/find/update/delete against one collection
//! - `Connection`: a shared driver client bound to one database
//! - `ConnectionConfig`: driver settings from code, the environment, or a
//!   `mongowrap.toml` settings file
//!
//! Connection pooling, timeouts and retries belong to the driver. This crate
//! forwards calls and maps driver failures into [`RepositoryError`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use mongowrap_mongodb::{Repository, doc};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let users = Repository::connect("users", "app", "mongodb://localhost:27017").await?;
//!
//!     let id = users.create(&doc! { "name": "Alice" }).await?;
//!     let matches: Vec<_> = users.find(doc! { "_id": id }).await?.try_collect().await?;
//!     assert_eq!(matches.len(), 1);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod repository;
pub mod settings;

pub use bson::oid::ObjectId;
pub use bson::{Bson, Document, doc};
pub use client::Connection;
pub use config::{ConnectionConfig, ConnectionConfigBuilder};
pub use error::{RepositoryError, RepositoryResult};
pub use mongodb::{Collection, Cursor};
pub use repository::Repository;
pub use settings::Settings;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::Connection;
    pub use crate::config::{ConnectionConfig, ConnectionConfigBuilder};
    pub use crate::error::{RepositoryError, RepositoryResult};
    pub use crate::repository::Repository;
    pub use crate::settings::Settings;
    pub use bson::oid::ObjectId;
    pub use bson::{Bson, Document, doc};
}
