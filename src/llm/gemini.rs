//! Google Gemini provider implementation

use super::types::{LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService, GENERIC_API_ERROR_MESSAGE};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    api_key: String,
    endpoint: String,
    model_id: String,
}

impl GeminiService {
    /// Build a service for `model`, posting to `{base_url}/v1beta/models/{model}:generateContent`
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let model_id = model.into();
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model_id
        );

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint,
            model_id,
        })
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                };
                GeminiContent {
                    role: Some(role.to_string()),
                    parts: vec![GeminiPart {
                        text: Some(msg.text.clone()),
                    }],
                }
            })
            .collect();

        GeminiRequest { contents }
    }

    /// Only `candidates[0].content.parts[0].text` counts as a reply.
    fn normalize_response(resp: GeminiResponse) -> Result<LlmResponse, LlmError> {
        if let Some(message) = resp.error.and_then(GeminiError::into_message) {
            return Err(LlmError::unknown(message));
        }

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(LlmError::invalid_response)?;

        let text = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(LlmError::invalid_response)?;

        let usage = resp
            .usage_metadata
            .map(|meta| Usage {
                input_tokens: meta.prompt_token_count,
                output_tokens: meta.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            text,
            finish_reason: candidate.finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let gemini_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                // reqwest's Display includes the request URL
                let e = e.without_url();
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                let e = e.without_url();
                LlmError::network(format!("Failed to read response: {e}"))
            })?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .ok()
                .and_then(|resp| resp.error.into_message())
                .unwrap_or_else(|| GENERIC_API_ERROR_MESSAGE.to_string());
            tracing::debug!(status = %status, body = %body, "Gemini returned error status");
            return Err(LlmError::from_status(status.as_u16(), message));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, body = %body, "Failed to parse Gemini response");
            LlmError::invalid_response()
        })?;

        Self::normalize_response(gemini_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Non-text parts (inline data, function calls) deserialize with `text: None`
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: Option<String>,
    #[allow(dead_code)]
    code: Option<i32>,
    #[allow(dead_code)]
    status: Option<String>,
}

impl GeminiError {
    fn into_message(self) -> Option<String> {
        self.message.filter(|m| !m.trim().is_empty())
    }
}
