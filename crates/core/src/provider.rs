//! Provider trait — the abstraction over the model backend.
//!
//! A Provider knows how to send a conversation plus a tool catalog to a
//! model and get back either free text, one or more tool-call requests, or
//! both. The agent loop calls `complete()` without knowing which backend
//! is behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// One completion request: full history, catalog, and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gemini-2.5-flash").
    pub model: String,

    /// System instruction, sent out-of-band from the turn history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    /// The conversation turns.
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic).
    pub temperature: f32,

    /// The tool catalog the model may call into.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// A tool definition exposed to the model as part of its capability catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name — part of the wire contract with the model.
    pub name: String,

    /// Description of what the tool does.
    pub description: String,

    /// JSON Schema describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated turn (text and/or tool calls).
    pub message: Message,

    /// Token usage counters. The loop treats absence as a transport-level
    /// failure, so a well-behaved provider never returns `None` here.
    pub usage: Option<Usage>,

    /// Which model actually responded.
    pub model: String,
}

/// Token usage counters for one completion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub response_tokens: u32,
}

/// The model backend trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization_skips_empty_fields() {
        let req = ProviderRequest {
            model: "gemini-2.5-flash".into(),
            system_instruction: None,
            messages: vec![],
            temperature: 0.0,
            tools: vec![],
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("system_instruction"));
        assert!(!json.contains("tools"));
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "get_file_content".into(),
            description: "Read a file".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string" }
                },
                "required": ["file_path"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("get_file_content"));
        assert!(json.contains("file_path"));
    }
}
