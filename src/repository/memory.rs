use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{Document, DocumentStore, StoreError, new_document_id};

/// Process-local collection. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_descending(&self, field: &str) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents.read().await;

        let mut list: Vec<Document> = documents
            .iter()
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .collect();

        // Ties are broken by id so repeated listings come back in the same order.
        list.sort_by(|a, b| {
            let a_key = (a.data.get(field).and_then(Value::as_str), a.id.as_str());
            let b_key = (b.data.get(field).and_then(Value::as_str), b.id.as_str());
            b_key.cmp(&a_key)
        });

        Ok(list)
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.read().await.get(id).map(|data| Document {
            id: id.to_string(),
            data: data.clone(),
        }))
    }

    async fn create(&self, data: Map<String, Value>) -> Result<Document, StoreError> {
        let id = new_document_id();
        self.documents
            .write()
            .await
            .insert(id.clone(), data.clone());

        tracing::debug!("Stored document {id}");

        Ok(Document { id, data })
    }

    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let Some(data) = documents.get_mut(id) else {
            return Err(StoreError::MissingDocument(id.to_string()));
        };

        data.extend(fields);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.documents.write().await.remove(id);
        Ok(())
    }
}
