mod embedded;
mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// A schemaless document: a store-assigned id plus its JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),

    #[error("malformed document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No document to update: {0}")]
    MissingDocument(String),
}

/// A single collection of a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, ordered by `field` descending.
    async fn list_descending(&self, field: &str) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError>;

    /// Stores `data` under a freshly generated id and returns the stored document.
    async fn create(&self, data: Map<String, Value>) -> Result<Document, StoreError>;

    /// Merges `fields` into an existing document. Fails with
    /// [`StoreError::MissingDocument`] when there is nothing to merge into.
    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Removes a document. Removing an absent document is not an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Ids are random and never reused.
fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
