//! In-process `DocumentStore` used when no database is configured.
//!
//! Contents are lost on restart. Collections are ordered maps so listing
//! follows id order like the PostgreSQL adapter.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::ports::{
    CollectionPath, DocumentStore, DocumentStoreError, FieldFilter, StoredDocument,
    generate_document_id, with_mirrored_id,
};

type Collection = BTreeMap<String, Value>;

/// Volatile document store guarded by an async lock.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<BTreeMap<CollectionPath, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<StoredDocument, DocumentStoreError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|fields| StoredDocument::new(id, fields.clone()))
            .ok_or_else(|| DocumentStoreError::not_found(collection.as_str(), id))
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        fields: Value,
    ) -> Result<String, DocumentStoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.clone()).or_default();
        let mut id = generate_document_id();
        while documents.contains_key(&id) {
            id = generate_document_id();
        }
        documents.insert(id.clone(), with_mirrored_id(fields, &id));
        Ok(id)
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Value,
    ) -> Result<(), DocumentStoreError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.clone())
            .or_default()
            .insert(id.to_owned(), fields);
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), DocumentStoreError> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
            .map(|_| ())
            .ok_or_else(|| DocumentStoreError::not_found(collection.as_str(), id))
    }

    async fn list(
        &self,
        collection: &CollectionPath,
        filter: Option<FieldFilter>,
    ) -> Result<Vec<StoredDocument>, DocumentStoreError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(documents
            .iter()
            .filter(|(_, fields)| filter.as_ref().is_none_or(|filter| filter.matches(fields)))
            .map(|(id, fields)| StoredDocument::new(id.as_str(), fields.clone()))
            .collect())
    }

    async fn set_all(
        &self,
        collection: &CollectionPath,
        documents: Vec<StoredDocument>,
    ) -> Result<(), DocumentStoreError> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.clone()).or_default();
        for document in documents {
            target.insert(document.id, document.fields);
        }
        Ok(())
    }
}
