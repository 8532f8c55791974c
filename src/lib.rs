//! # mongowrap
//!
//! A repository facade and aggregation pipeline builder for MongoDB.
//!
//! mongowrap provides:
//! - [`Repository`]: create/find/update/delete against one collection, with
//!   the raw driver collection one call away
//! - [`PipelineBuilder`]: ordered, validated aggregation stages
//! - Configuration from code, the environment, or `mongowrap.toml`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use mongowrap::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mongowrap::RepositoryError> {
//!     let sales = Repository::connect("sales", "shop", "mongodb://localhost:27017").await?;
//!
//!     sales.create(&doc! { "region": "eu", "amount": 40 }).await?;
//!
//!     let mut builder = PipelineBuilder::new();
//!     builder
//!         .match_stage(doc! { "amount": { "$gt": 10 } })
//!         .group(["region"], doc! { "total": accumulators::sum("$amount") })?
//!         .sort([("total", -1)])?
//!         .limit(5)?;
//!
//!     let top: Vec<Document> = sales.aggregate(builder.build()).await?.try_collect().await?;
//!     println!("{top:?}");
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Aggregation pipeline construction.
pub mod pipeline {
    pub use mongowrap_pipeline::*;
}

/// Repository facade and connection handling.
pub mod mongodb {
    pub use mongowrap_mongodb::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use mongowrap_mongodb::prelude::*;
    pub use mongowrap_pipeline::{GroupKey, PipelineBuilder, ValidationError, accumulators};
}

// Re-export key types at the crate root
pub use mongowrap_mongodb::{
    Connection, ConnectionConfig, Repository, RepositoryError, RepositoryResult, Settings,
};
pub use mongowrap_pipeline::{PipelineBuilder, ValidationError};
