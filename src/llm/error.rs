//! LLM error types

use thiserror::Error;

/// Detail reported when a success response lacks the reply text
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid API response.";

/// Detail reported for a non-2xx status whose body carries no `error.message`
pub const GENERIC_API_ERROR_MESSAGE: &str = "API error.";

/// LLM error with classification
///
/// `message` is the human-readable detail only; callers add their own framing.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn invalid_response() -> Self {
        Self::new(LlmErrorKind::InvalidResponse, INVALID_RESPONSE_MESSAGE)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }

    /// Classify a non-2xx status, keeping the provider's detail as the message
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            400 => Self::invalid_request(message),
            401 | 403 => Self::auth(message),
            429 => Self::rate_limit(message),
            500..=599 => Self::server_error(message),
            _ => Self::unknown(message),
        }
    }
}

/// Error classification
///
/// Turns are never retried; `is_retryable` only feeds the request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Network issues, timeouts
    Network,
    /// Rate limited (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (400)
    InvalidRequest,
    /// 2xx body without a usable reply
    InvalidResponse,
    /// Unknown error
    Unknown,
}

impl LlmErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
