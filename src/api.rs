//! HTTP API for the chat session
//!
//! The browser client polls or streams the transcript and posts new turns.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::session::ChatSession;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ChatSession>,
}

impl AppState {
    pub fn new(session: Arc<ChatSession>) -> Self {
        Self { session }
    }
}
