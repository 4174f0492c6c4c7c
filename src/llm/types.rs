//! Common types for LLM interactions

/// LLM request: the full conversation, oldest turn first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmRequest {
    pub messages: Vec<LlmMessage>,
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub text: String,
}

impl LlmMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

/// LLM response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    /// Reply text; never empty
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

impl LlmResponse {
    #[cfg(test)]
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
