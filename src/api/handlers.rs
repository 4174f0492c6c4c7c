//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{ChatRequest, ChatResponse, TranscriptResponse};
use super::AppState;
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/transcript", get(get_transcript))
        .route("/api/messages", post(send_message))
        .route("/api/stream", get(stream_transcript))
        .route("/version", get(get_version))
        .with_state(state)
}

async fn get_transcript(State(state): State<AppState>) -> Json<TranscriptResponse> {
    let (messages, busy) = state.session.view();
    Json(TranscriptResponse { messages, busy })
}

/// Accepts the turn synchronously; the provider call settles on its own task
async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    match state.session.begin(&req.text) {
        Ok(turn) => {
            tokio::spawn(turn.settle());
            Json(ChatResponse {
                accepted: true,
                reason: None,
            })
        }
        Err(rejection) => {
            tracing::debug!(reason = rejection.as_str(), "Chat message ignored");
            Json(ChatResponse {
                accepted: false,
                reason: Some(rejection.as_str()),
            })
        }
    }
}

async fn stream_transcript(State(state): State<AppState>) -> impl IntoResponse {
    sse_stream(Arc::clone(&state.session))
}

async fn get_version() -> &'static str {
    concat!("gemini-chat ", env!("CARGO_PKG_VERSION"))
}
