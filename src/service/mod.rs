use serde_json::{Map, Value};

use crate::{
    dto::{CreateNoteRequest, NoteResponse, UpdateNoteRequest},
    models::{Note, timestamp},
    repository::{DocumentStore, StoreError},
};

use std::sync::Arc;

const ORDER_FIELD: &str = "created_at";

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn DocumentStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create_note(&self, request: CreateNoteRequest) -> Result<NoteResponse, StoreError> {
        let fields = Note::new_fields(
            request.title,
            request.detail.unwrap_or_default(),
            timestamp::now(),
        );
        let document = self.store.create(fields).await?;

        tracing::info!("Created note {}", document.id);

        Ok(Note::try_from(document)?.into())
    }

    /// Returns `None` when no note with `id` exists.
    pub async fn update_note(
        &self,
        id: &str,
        request: UpdateNoteRequest,
    ) -> Result<Option<NoteResponse>, StoreError> {
        let Some(existing) = self.find_note(id).await? else {
            return Ok(None);
        };

        let mut fields = Map::new();
        fields.insert(
            "updated_at".to_string(),
            timestamp::to_value(timestamp::after(existing.updated_at)),
        );
        if let Some(title) = request.title {
            fields.insert("title".to_string(), Value::String(title));
        }
        if let Some(detail) = request.detail {
            fields.insert("detail".to_string(), Value::String(detail));
        }

        self.store.update(id, fields).await?;

        tracing::info!("Updated note {id}");

        Ok(self.find_note(id).await?.map(Into::into))
    }

    /// Returns `false` when no note with `id` exists.
    pub async fn delete_note(&self, id: &str) -> Result<bool, StoreError> {
        if self.store.get(id).await?.is_none() {
            return Ok(false);
        }

        self.store.delete(id).await?;

        tracing::info!("Deleted note {id}");

        Ok(true)
    }

    pub async fn get_one_note(&self, id: &str) -> Result<Option<NoteResponse>, StoreError> {
        Ok(self.find_note(id).await?.map(Into::into))
    }

    /// All notes, newest first.
    pub async fn get_all_notes(&self) -> Result<Vec<NoteResponse>, StoreError> {
        self.store
            .list_descending(ORDER_FIELD)
            .await?
            .into_iter()
            .map(|document| {
                Note::try_from(document)
                    .map(NoteResponse::from)
                    .map_err(StoreError::from)
            })
            .collect()
    }

    async fn find_note(&self, id: &str) -> Result<Option<Note>, StoreError> {
        match self.store.get(id).await? {
            Some(document) => Ok(Some(Note::try_from(document)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    fn service() -> NoteService {
        NoteService::new(Arc::new(MemoryStore::new()))
    }

    fn create_request(title: &str) -> CreateNoteRequest {
        CreateNoteRequest {
            title: title.to_string(),
            detail: None,
        }
    }

    #[tokio::test]
    async fn test_create_sets_equal_timestamps() {
        let service = service();
        let note = service.create_note(create_request("A")).await.unwrap();

        assert!(!note.id.is_empty());
        assert_eq!(note.title, "A");
        assert_eq!(note.detail, "");
        assert_eq!(note.created_at, note.updated_at);
        assert!(note.created_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let service = service();
        let created = service
            .create_note(CreateNoteRequest {
                title: "A".to_string(),
                detail: Some("first".to_string()),
            })
            .await
            .unwrap();

        let updated = service
            .update_note(
                &created.id,
                UpdateNoteRequest {
                    title: Some("B".to_string()),
                    detail: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "B");
        assert_eq!(updated.detail, "first");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_repeated_updates_keep_advancing() {
        let service = service();
        let created = service.create_note(create_request("A")).await.unwrap();

        let mut previous = created.updated_at;
        for _ in 0..5 {
            let updated = service
                .update_note(&created.id, UpdateNoteRequest::default())
                .await
                .unwrap()
                .unwrap();
            assert!(updated.updated_at > previous);
            previous = updated.updated_at;
        }
    }

    #[tokio::test]
    async fn test_update_missing_note() {
        let service = service();
        let result = service
            .update_note("missing", UpdateNoteRequest::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let service = service();
        let created = service.create_note(create_request("A")).await.unwrap();

        assert!(service.delete_note(&created.id).await.unwrap());
        assert!(service.get_one_note(&created.id).await.unwrap().is_none());
        assert!(!service.delete_note(&created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_all_newest_first() {
        let service = service();
        for title in ["first", "second", "third"] {
            service.create_note(create_request(title)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let listed = service.get_all_notes().await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|note| note.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        assert_eq!(service.get_all_notes().await.unwrap(), listed);
    }
}
