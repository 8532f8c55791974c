//! # mongowrap-pipeline
//!
//! A fluent builder for MongoDB aggregation pipelines.
//!
//! The builder only checks the shape of its arguments (non-negative
//! `$skip`/`$limit`, `(field, 1 | -1)` sort pairs, well-formed group keys).
//! Stage bodies are otherwise passed through to the server untouched.
//!
//! ```rust
//! use bson::doc;
//! use mongowrap_pipeline::PipelineBuilder;
//!
//! let mut builder = PipelineBuilder::new();
//! builder
//!     .match_stage(doc! { "status": "active" })
//!     .unwind("$items");
//!
//! let pipeline = builder.build();
//! assert_eq!(pipeline[1], doc! { "$unwind": "$items" });
//! ```

pub mod accumulators;
pub mod builder;
pub mod error;
pub mod stage;

pub use builder::PipelineBuilder;
pub use error::{ValidationError, ValidationResult};
pub use stage::{GroupKey, Stage, StageOperator};
