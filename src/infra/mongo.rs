use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection, Database};
use tracing::debug;

use super::store::DocumentStore;

pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_MONGO_DB: &str = "AutoToolDevOPS";

#[derive(Debug, Clone)]
pub struct MongoSettings {
    pub uri: String,
    pub database: String,
}

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(settings: &MongoSettings) -> Result<Self> {
        let client = Client::with_uri_str(&settings.uri)
            .await
            .context("Failed to create MongoDB client")?;
        debug!(database = %settings.database, "Connected to MongoDB");
        Ok(Self {
            db: client.database(&settings.database),
        })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn name(&self) -> &str {
        self.db.name()
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64> {
        let res = self
            .collection(collection)
            .delete_many(filter)
            .await
            .with_context(|| format!("Failed to delete from {}", collection))?;
        Ok(res.deleted_count)
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize> {
        let res = self
            .collection(collection)
            .insert_many(docs)
            .await
            .with_context(|| format!("Failed to insert into {}", collection))?;
        Ok(res.inserted_ids.len())
    }

    async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64> {
        self.collection(collection)
            .count_documents(filter)
            .await
            .with_context(|| format!("Failed to count documents in {}", collection))
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one(filter)
            .await
            .with_context(|| format!("Failed to query {}", collection))
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        let cursor = self
            .collection(collection)
            .find(filter)
            .await
            .with_context(|| format!("Failed to query {}", collection))?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        self.db
            .list_collection_names()
            .await
            .context("Failed to list collections")
    }

    async fn set_field(&self, collection: &str, filter: Document, path: &str, value: Bson) -> Result<u64> {
        let mut fields = Document::new();
        fields.insert(path, value);
        let res = self
            .collection(collection)
            .update_one(filter, doc! { "$set": fields })
            .await
            .with_context(|| format!("Failed to update {}", collection))?;
        Ok(res.modified_count)
    }
}
