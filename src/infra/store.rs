use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

/// The handful of document-database operations the import and maintenance
/// commands need. Implemented for MongoDB and for an in-memory map.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable name of the backing database.
    fn name(&self) -> &str;

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64>;

    /// Insert all of `docs`, returning how many were inserted.
    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize>;

    async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64>;

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>>;

    async fn list_collection_names(&self) -> Result<Vec<String>>;

    /// `$set` one (possibly dotted) field on the first matching document,
    /// returning the modified count.
    async fn set_field(&self, collection: &str, filter: Document, path: &str, value: Bson) -> Result<u64>;
}
