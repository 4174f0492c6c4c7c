//! API request and response types

use crate::session::Message;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response for chat action
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Current transcript and turn state
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<Message>,
    pub busy: bool,
}
