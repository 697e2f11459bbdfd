use serde::{Deserialize, Serialize};

use crate::models::{Note, timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteResponse {
    /// Note ID
    pub id: String,
    /// Note title
    pub title: String,
    /// Note body
    pub detail: String,
    /// Creation time, RFC 3339 with `Z` suffix
    pub created_at: String,
    /// Last modification time, RFC 3339 with `Z` suffix
    pub updated_at: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            detail: note.detail,
            created_at: timestamp::format(note.created_at),
            updated_at: timestamp::format(note.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    /// Note title
    pub title: String,
    /// Note body, empty when omitted or null
    #[serde(default)]
    pub detail: Option<String>,
}

/// Partial update. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
