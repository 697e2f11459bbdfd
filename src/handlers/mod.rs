pub mod rest;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use std::sync::Arc;

use crate::service::NoteService;

/// Every path goes to the REST dispatcher. CORS headers are attached to all
/// responses, errors and preflight included.
///
/// The request body limit is disabled so that buffering the body never fails
/// ahead of the dispatcher and every response keeps the JSON error shape.
pub fn router(service: Arc<NoteService>) -> Router {
    Router::new()
        .fallback(rest::dispatch)
        .with_state(service)
        .layer(DefaultBodyLimit::disable())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,POST,PUT,DELETE,OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
}
