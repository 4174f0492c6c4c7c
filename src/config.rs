//! Runtime configuration from environment variables

use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GREETING: &str = "Hi there! How can I help you today?";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
}

/// Configuration for the chat service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Opening assistant message; `None` starts with an empty transcript
    pub greeting: Option<String>,
    pub port: u16,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        // An explicitly empty CHAT_GREETING disables the greeting
        let greeting = match lookup("CHAT_GREETING") {
            Some(raw) => Some(raw.trim().to_string()).filter(|g| !g.is_empty()),
            None => Some(DEFAULT_GREETING.to_string()),
        };

        Ok(Self {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(parse_or(
                "GEMINI_TIMEOUT_SECS",
                get("GEMINI_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )),
            greeting,
            port: parse_or("CHAT_PORT", get("CHAT_PORT"), DEFAULT_PORT),
        })
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    value: Option<String>,
    default: T,
) -> T {
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
    }
}
