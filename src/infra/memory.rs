use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::store::DocumentStore;

/// In-process [`DocumentStore`] backing `import --dry-run`.
///
/// Filters support equality on (dotted) fields and a top-level `$or`, which
/// is all the import and audit paths issue.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_collections<T>(&self, f: impl FnOnce(&mut BTreeMap<String, Vec<Document>>) -> T) -> Result<T> {
        let mut guard = self
            .collections
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(f(&mut guard))
    }
}

fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_document()?.get(part)?;
    }
    Some(current)
}

fn set_path(doc: &mut Document, path: &str, value: Bson) -> bool {
    match path.split_once('.') {
        None => {
            let changed = doc.get(path) != Some(&value);
            doc.insert(path, value);
            changed
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            match doc.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, rest, value),
                _ => false,
            }
        }
    }
}

pub fn matches_filter(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| {
        if key == "$or" {
            return expected
                .as_array()
                .map(|alts| {
                    alts.iter()
                        .filter_map(Bson::as_document)
                        .any(|alt| matches_filter(doc, alt))
                })
                .unwrap_or(false);
        }
        get_path(doc, key) == Some(expected)
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64> {
        self.with_collections(|cols| {
            let Some(docs) = cols.get_mut(collection) else {
                return 0;
            };
            let before = docs.len();
            docs.retain(|d| !matches_filter(d, &filter));
            (before - docs.len()) as u64
        })
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize> {
        self.with_collections(|cols| {
            let existing = cols.entry(collection.to_string()).or_default();
            for (i, doc) in docs.iter().enumerate() {
                let Some(id) = doc.get("_id") else {
                    continue;
                };
                let clashes = existing
                    .iter()
                    .chain(&docs[..i])
                    .any(|d| d.get("_id") == Some(id));
                if clashes {
                    return Err(anyhow!("duplicate key in {}: _id {}", collection, id));
                }
            }
            let count = docs.len();
            existing.extend(docs);
            Ok(count)
        })?
    }

    async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64> {
        Ok(self.find(collection, filter).await?.len() as u64)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        self.with_collections(|cols| {
            cols.get(collection)
                .map(|docs| docs.iter().filter(|d| matches_filter(d, &filter)).cloned().collect())
                .unwrap_or_default()
        })
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        self.with_collections(|cols| cols.keys().cloned().collect())
    }

    async fn set_field(&self, collection: &str, filter: Document, path: &str, value: Bson) -> Result<u64> {
        self.with_collections(|cols| {
            cols.get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| matches_filter(d, &filter)))
                .map(|doc| set_path(doc, path, value) as u64)
                .unwrap_or(0)
        })
    }
}
