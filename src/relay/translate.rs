//! Inbound chat request types and their projection into the Bedrock
//! invocation payload.
//!
//! Bedrock's Anthropic-format API takes the protocol version inside the
//! request body and the model ID on the SDK call, so the payload carries
//! everything except the model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol version Bedrock requires in every Anthropic-format body.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// The caller supplied zero messages.
    #[error("Messages are required")]
    EmptyMessages,
}

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Chat completion request accepted by the relay.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    #[serde(default)]
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Informational only; responses are always streamed.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_temperature() -> f64 {
    0.5
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_stream() -> bool {
    true
}

/// Body for Bedrock's `InvokeModelWithResponseStream` call.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderPayload {
    pub max_tokens: u32,
    pub anthropic_version: &'static str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// Project a [`ChatRequest`] into the Bedrock invocation payload.
///
/// `max_tokens` and `temperature` pass through from the request;
/// `anthropic_version` is a constant of the integration. A `system`
/// prompt is carried only when present and non-empty, otherwise the
/// key is omitted from the serialized body entirely.
pub fn translate(request: &ChatRequest) -> Result<ProviderPayload, TranslateError> {
    if request.messages.is_empty() {
        return Err(TranslateError::EmptyMessages);
    }

    let system = request
        .system
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_owned);

    Ok(ProviderPayload {
        max_tokens: request.max_tokens,
        anthropic_version: ANTHROPIC_VERSION,
        messages: request.messages.clone(),
        temperature: request.temperature,
        system,
    })
}
