use anyhow::{anyhow, Context, Result};
use mongodb::bson::{self, doc, Document};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::infra::fs::load_json;
use crate::infra::store::DocumentStore;
use crate::models::{CollectionFile, COLLECTION_FILES};

/// Filter selecting the documents that belong to `service` in `entry`'s collection.
pub fn service_filter(entry: &CollectionFile, service: &str) -> Document {
    if entry.keyed_by_name() {
        doc! { "$or": [{ "_id": service }, { "name": service }] }
    } else {
        doc! { "service_name": service }
    }
}

/// Normalize a loaded collection file into documents: absent or `null` is
/// empty, a single object is a one-element list.
pub fn to_documents(data: Option<Value>) -> Result<Vec<Document>> {
    let items = match data {
        None | Some(Value::Null) => vec![],
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                return Err(anyhow!("Entry {} is not a JSON object", i));
            }
            bson::to_document(item).with_context(|| format!("Entry {} cannot be stored", i))
        })
        .collect()
}

pub fn document_to_json(doc: Document) -> Result<Value> {
    Ok(bson::from_document(doc)?)
}

/// Replace `service`'s documents in one collection. Nothing is deleted when
/// there is nothing to insert.
pub async fn import_collection(
    store: &dyn DocumentStore,
    entry: &CollectionFile,
    docs: Vec<Document>,
    service: &str,
) -> Result<usize> {
    if docs.is_empty() {
        return Ok(0);
    }
    let deleted = store
        .delete_many(entry.collection, service_filter(entry, service))
        .await?;
    debug!(collection = entry.collection, deleted, "Cleared previous documents");
    store.insert_many(entry.collection, docs).await
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportReport {
    /// (file, collection, inserted) in import order.
    pub collections: Vec<(&'static str, &'static str, usize)>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.collections.iter().map(|(_, _, n)| n).sum()
    }
}

/// Import every collection file under `<root>/<service>` into `store`.
pub async fn import_service(store: &dyn DocumentStore, root: &Path, service: &str) -> Result<ImportReport> {
    let service_dir = root.join(service);
    if !service_dir.is_dir() {
        return Err(anyhow!("JSON folder not found: {:?}", service_dir));
    }
    info!(service, "Importing collections from {:?} into {}", service_dir, store.name());

    let mut report = ImportReport::default();
    for entry in COLLECTION_FILES.iter() {
        let path = service_dir.join(entry.file);
        let docs = to_documents(load_json(&path)?)
            .with_context(|| format!("Invalid collection file {:?}", path))?;
        let count = import_collection(store, entry, docs, service).await?;
        report.collections.push((entry.file, entry.collection, count));
    }
    Ok(report)
}
