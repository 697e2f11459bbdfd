mod error;
mod routing;

pub use error::ApiError;
use routing::Target;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use serde::de::DeserializeOwned;
use serde_json::Value;

use std::sync::Arc;

use crate::{
    dto::{CreateNoteRequest, MessageResponse, UpdateNoteRequest},
    service::NoteService,
};

/// Single entrypoint for every request. Routes on the path shape and method
/// rather than on registered routes.
#[debug_handler]
pub async fn dispatch(
    State(service): State<Arc<NoteService>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    // Preflight is answered for any path, valid or not.
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    match handle(&service, &method, uri.path(), &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn handle(
    service: &NoteService,
    method: &Method,
    path: &str,
    body: &[u8],
) -> Result<Response, ApiError> {
    let target = Target::parse(path).ok_or(ApiError::RouteNotFound)?;

    tracing::debug!("Dispatching {method} {target:?}");

    match (method, target) {
        (&Method::GET, Target::Collection) => get_all_notes(service).await,
        (&Method::GET, Target::Item(id)) => get_one_note(service, id).await,
        (&Method::POST, Target::Collection) => create_note(service, body).await,
        (&Method::PUT | &Method::PATCH, Target::Item(id)) => update_note(service, id, body).await,
        (&Method::DELETE, Target::Item(id)) => delete_note(service, id).await,
        _ => Err(ApiError::MethodNotAllowed),
    }
}

/// Reads a request body that must be a non-empty JSON object of shape `T`.
fn parse_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) if !fields.is_empty() => {
            serde_json::from_value(Value::Object(fields)).map_err(|e| {
                tracing::debug!("Rejected payload: {e}");
                ApiError::InvalidJson
            })
        }
        _ => Err(ApiError::InvalidJson),
    }
}

async fn get_all_notes(service: &NoteService) -> Result<Response, ApiError> {
    let notes = service.get_all_notes().await?;
    Ok((StatusCode::OK, Json(notes)).into_response())
}

async fn get_one_note(service: &NoteService, id: &str) -> Result<Response, ApiError> {
    let note = service
        .get_one_note(id)
        .await?
        .ok_or(ApiError::NoteNotFound)?;
    Ok((StatusCode::OK, Json(note)).into_response())
}

async fn create_note(service: &NoteService, body: &[u8]) -> Result<Response, ApiError> {
    let payload: CreateNoteRequest = parse_payload(body)?;
    let note = service.create_note(payload).await?;
    Ok((StatusCode::CREATED, Json(note)).into_response())
}

async fn update_note(service: &NoteService, id: &str, body: &[u8]) -> Result<Response, ApiError> {
    let payload: UpdateNoteRequest = parse_payload(body)?;
    let note = service
        .update_note(id, payload)
        .await?
        .ok_or(ApiError::NoteNotFound)?;
    Ok((StatusCode::OK, Json(note)).into_response())
}

async fn delete_note(service: &NoteService, id: &str) -> Result<Response, ApiError> {
    if !service.delete_note(id).await? {
        return Err(ApiError::NoteNotFound);
    }

    let body = MessageResponse {
        message: "Note deleted".to_string(),
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_rejects_non_objects() {
        let bodies: [&[u8]; 6] = [b"", b"not json", b"[]", b"\"title\"", b"null", b"{}"];
        for body in bodies {
            assert!(matches!(
                parse_payload::<UpdateNoteRequest>(body),
                Err(ApiError::InvalidJson)
            ));
        }
    }

    #[test]
    fn test_parse_payload_requires_title_on_create() {
        assert!(parse_payload::<CreateNoteRequest>(br#"{"detail": "x"}"#).is_err());
        assert!(parse_payload::<CreateNoteRequest>(br#"{"title": 5}"#).is_err());
        assert!(parse_payload::<CreateNoteRequest>(br#"{"title": null}"#).is_err());

        let payload: CreateNoteRequest = parse_payload(br#"{"title": "A"}"#).unwrap();
        assert_eq!(payload.title, "A");
        assert!(payload.detail.is_none());

        let payload: CreateNoteRequest =
            parse_payload(br#"{"title": "A", "detail": null}"#).unwrap();
        assert!(payload.detail.is_none());
    }

    #[test]
    fn test_parse_payload_update_fields_are_optional() {
        let payload: UpdateNoteRequest = parse_payload(br#"{"unrelated": true}"#).unwrap();
        assert!(payload.title.is_none());
        assert!(payload.detail.is_none());

        let payload: UpdateNoteRequest = parse_payload(br#"{"title": null, "detail": "x"}"#).unwrap();
        assert!(payload.title.is_none());
        assert_eq!(payload.detail.as_deref(), Some("x"));
    }
}
