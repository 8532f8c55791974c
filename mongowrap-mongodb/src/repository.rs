//! Repository facade over a single collection.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use mongowrap_mongodb::{Repository, doc};
//! use mongowrap_pipeline::PipelineBuilder;
//!
//! let users = Repository::connect("users", "app", "mongodb://localhost:27017").await?;
//!
//! let id = users.create(&doc! { "name": "Alice", "team": "core" }).await?;
//! let found: Vec<_> = users.find(doc! { "_id": id }).await?.try_collect().await?;
//!
//! let mut builder = PipelineBuilder::new();
//! builder.group(["team"], doc! { "members": { "$sum": 1 } })?;
//! let per_team: Vec<_> = users.aggregate(builder.build()).await?.try_collect().await?;
//!
//! users.delete(doc! { "team": "core" }).await?;
//! ```

use std::collections::BTreeMap;

use bson::{Bson, Document};
use mongodb::options::UpdateOptions;
use mongodb::{Collection, Cursor};
use mongowrap_pipeline::PipelineBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::Connection;
use crate::config::ConnectionConfig;
use crate::error::RepositoryResult;

/// CRUD access to one collection.
///
/// Filters and update documents are handed to the driver unchanged. Every
/// operation performs network I/O; nothing is cached or retried here.
///
/// `T` is the document type; it defaults to a raw [`Document`].
pub struct Repository<T = Document>
where
    T: Send + Sync,
{
    connection: Connection,
    collection: Collection<T>,
}

impl<T> Repository<T>
where
    T: Send + Sync,
{
    /// Connect to `collection_name` in `database_name` on the server at `uri`.
    pub async fn connect(
        collection_name: &str,
        database_name: &str,
        uri: &str,
    ) -> RepositoryResult<Self> {
        let config = ConnectionConfig::builder()
            .uri(uri)
            .database(database_name)
            .build()?;
        Self::from_config(collection_name, config).await
    }

    /// Connect using a full configuration.
    pub async fn from_config(
        collection_name: &str,
        config: ConnectionConfig,
    ) -> RepositoryResult<Self> {
        let connection = Connection::new(config).await?;
        Ok(Self::from_connection(&connection, collection_name))
    }

    /// Bind to a collection on an existing connection.
    pub fn from_connection(connection: &Connection, collection_name: &str) -> Self {
        Self {
            connection: connection.clone(),
            collection: connection.collection(collection_name),
        }
    }

    /// The raw driver collection, for operations the facade does not cover.
    pub fn query_repo(&self) -> &Collection<T> {
        &self.collection
    }

    /// The connection this repository uses.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Connection URI.
    pub fn uri(&self) -> &str {
        &self.connection.config().uri
    }

    /// Database name.
    pub fn database_name(&self) -> &str {
        &self.connection.config().database
    }

    /// Collection name.
    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    /// Check that the server is reachable.
    pub async fn ping(&self) -> RepositoryResult<()> {
        self.connection.ping().await
    }

    /// Apply `changes` to every document matching `filter`.
    ///
    /// Returns the number of documents modified.
    pub async fn update(&self, filter: Document, changes: Document) -> RepositoryResult<u64> {
        debug!(collection = %self.collection_name(), filter = %filter, "Updating documents");
        let result = self.collection.update_many(filter, changes, None).await?;
        Ok(result.modified_count)
    }

    /// Apply `changes` to the first document matching `filter`.
    pub async fn update_one(&self, filter: Document, changes: Document) -> RepositoryResult<u64> {
        debug!(collection = %self.collection_name(), filter = %filter, "Updating one document");
        let result = self.collection.update_one(filter, changes, None).await?;
        Ok(result.modified_count)
    }

    /// Update the first match, or insert a new document if nothing matches.
    ///
    /// Returns the new document's `_id` when one was inserted.
    pub async fn upsert(
        &self,
        filter: Document,
        changes: Document,
    ) -> RepositoryResult<Option<Bson>> {
        debug!(collection = %self.collection_name(), filter = %filter, "Upserting document");
        let options = UpdateOptions::builder().upsert(true).build();
        let result = self.collection.update_one(filter, changes, options).await?;
        Ok(result.upserted_id)
    }

    /// Delete every document matching `filter`.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete(&self, filter: Document) -> RepositoryResult<u64> {
        debug!(collection = %self.collection_name(), filter = %filter, "Deleting documents");
        let result = self.collection.delete_many(filter, None).await?;
        Ok(result.deleted_count)
    }

    /// Delete the first document matching `filter`.
    pub async fn delete_one(&self, filter: Document) -> RepositoryResult<u64> {
        debug!(collection = %self.collection_name(), filter = %filter, "Deleting one document");
        let result = self.collection.delete_one(filter, None).await?;
        Ok(result.deleted_count)
    }

    /// Count documents matching `filter`.
    pub async fn count(&self, filter: Document) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(filter, None).await?)
    }

    /// Run an aggregation pipeline.
    pub async fn aggregate(
        &self,
        pipeline: impl IntoIterator<Item = Document>,
    ) -> RepositoryResult<Cursor<Document>> {
        let pipeline: Vec<Document> = pipeline.into_iter().collect();
        debug!(
            collection = %self.collection_name(),
            stages = pipeline.len(),
            "Running aggregation"
        );
        Ok(self.collection.aggregate(pipeline, None).await?)
    }

    /// Run the pipeline assembled by `builder`.
    pub async fn aggregate_with(
        &self,
        builder: &PipelineBuilder,
    ) -> RepositoryResult<Cursor<Document>> {
        self.aggregate(builder.build()).await
    }
}

impl<T> Repository<T>
where
    T: Serialize + Send + Sync,
{
    /// Insert one document and return the `_id` the store assigned.
    pub async fn create(&self, document: &T) -> RepositoryResult<Bson> {
        debug!(collection = %self.collection_name(), "Inserting document");
        let result = self.collection.insert_one(document, None).await?;
        Ok(result.inserted_id)
    }

    /// Insert several documents; returns their ids in input order.
    ///
    /// An empty slice is a no-op.
    pub async fn create_many(&self, documents: &[T]) -> RepositoryResult<Vec<Bson>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            collection = %self.collection_name(),
            count = documents.len(),
            "Inserting documents"
        );
        let result = self.collection.insert_many(documents, None).await?;

        let ordered: BTreeMap<usize, Bson> = result.inserted_ids.into_iter().collect();
        Ok(ordered.into_values().collect())
    }
}

impl<T> Repository<T>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    /// Find documents matching `filter`.
    ///
    /// The cursor is lazy and can only be consumed once.
    pub async fn find(&self, filter: Document) -> RepositoryResult<Cursor<T>> {
        debug!(collection = %self.collection_name(), filter = %filter, "Finding documents");
        Ok(self.collection.find(filter, None).await?)
    }

    /// Find the first document matching `filter`.
    pub async fn find_one(&self, filter: Document) -> RepositoryResult<Option<T>> {
        debug!(collection = %self.collection_name(), filter = %filter, "Finding one document");
        Ok(self.collection.find_one(filter, None).await?)
    }
}

impl<T> Clone for Repository<T>
where
    T: Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            collection: self.collection.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Repository<T>
where
    T: Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("uri", &self.uri())
            .field("database", &self.database_name())
            .field("collection", &self.collection_name())
            .finish()
    }
}
