//! Gemini provider implementation.
//!
//! Talks to the `generateContent` REST endpoint directly:
//! - `x-goog-api-key` header authentication
//! - System instruction as a top-level field
//! - Native function calling with `functionCall` / `functionResponse` parts
//! - `usageMetadata` is required; its absence is treated as a transport
//!   failure, never a recoverable one

use async_trait::async_trait;
use burrow_core::error::ProviderError;
use burrow_core::message::{Message, Role, ToolCall};
use burrow_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini `generateContent` API provider.
pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert conversation turns to Gemini content objects.
    fn to_contents(messages: &[Message]) -> Vec<GeminiContent> {
        let mut result = Vec::with_capacity(messages.len());

        for msg in messages {
            let mut parts: Vec<GeminiPart> = Vec::new();

            match msg.role {
                Role::User => {
                    if msg.tool_results.is_empty() {
                        parts.push(GeminiPart::text(&msg.content));
                    } else {
                        // One round's tool results travel as a single
                        // content with one functionResponse part per call.
                        for tr in &msg.tool_results {
                            parts.push(GeminiPart {
                                function_response: Some(GeminiFunctionResponse {
                                    name: tr.name.clone(),
                                    response: serde_json::json!({ "result": tr.output }),
                                }),
                                ..Default::default()
                            });
                        }
                    }
                }
                Role::Model => {
                    if !msg.content.is_empty() {
                        parts.push(GeminiPart::text(&msg.content));
                    }
                    for tc in &msg.tool_calls {
                        parts.push(GeminiPart {
                            function_call: Some(GeminiFunctionCall {
                                name: tc.name.clone(),
                                args: tc.arguments.clone(),
                            }),
                            ..Default::default()
                        });
                    }
                }
            }

            result.push(GeminiContent {
                role: match msg.role {
                    Role::User => "user".into(),
                    Role::Model => "model".into(),
                },
                parts,
            });
        }

        result
    }

    /// Convert tool definitions to Gemini function declarations.
    fn to_declarations(tools: &[ToolDefinition]) -> Vec<GeminiFunctionDeclaration> {
        tools
            .iter()
            .map(|t| GeminiFunctionDeclaration {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect()
    }

    /// Convert an API response to our ProviderResponse.
    fn to_provider_response(
        resp: GenerateContentResponse,
        requested_model: &str,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let usage = resp.usage_metadata.ok_or_else(|| {
            ProviderError::MalformedResponse("response missing usage metadata".into())
        })?;

        let candidate = resp.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::MalformedResponse("response contained no candidates".into())
        })?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        if let Some(content) = candidate.content {
            for part in content.parts {
                if let Some(t) = part.text {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&t);
                }
                if let Some(fc) = part.function_call {
                    tool_calls.push(ToolCall {
                        name: fc.name,
                        arguments: fc.args,
                    });
                }
            }
        }

        Ok(ProviderResponse {
            message: Message::model(text, tool_calls),
            usage: Some(Usage {
                prompt_tokens: usage.prompt_token_count.unwrap_or_default(),
                response_tokens: usage.candidates_token_count.unwrap_or_default(),
            }),
            model: resp.model_version.unwrap_or_else(|| requested_model.into()),
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );

        let mut body = serde_json::json!({
            "contents": Self::to_contents(&request.messages),
            "generationConfig": { "temperature": request.temperature },
        });

        if let Some(ref system) = request.system_instruction {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system }]
            });
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!([{
                "functionDeclarations": Self::to_declarations(&request.tools)
            }]);
        }

        debug!(provider = "gemini", model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GenerateContentResponse =
            response.json().await.map_err(|e| {
                ProviderError::MalformedResponse(format!("failed to parse Gemini response: {e}"))
            })?;

        Self::to_provider_response(api_resp, &request.model)
    }
}

// --- Gemini API types ---

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,

    usage_metadata: Option<GeminiUsageMetadata>,

    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::message::ToolResponse;

    #[test]
    fn constructor() {
        let provider = GeminiProvider::new("test-key");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn constructor_with_base_url() {
        let provider = GeminiProvider::new("test-key").with_base_url("http://localhost:9999/");
        assert_eq!(provider.base_url, "http://localhost:9999");
    }

    #[test]
    fn user_text_conversion() {
        let contents = GeminiProvider::to_contents(&[Message::user("hello")]);
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[0].parts[0].text.as_deref(), Some("hello"));
    }

    #[test]
    fn model_turn_with_calls_conversion() {
        let msg = Message::model(
            "Let me look",
            vec![ToolCall {
                name: "get_files_info".into(),
                arguments: serde_json::json!({"directory": "pkg"}),
            }],
        );
        let contents = GeminiProvider::to_contents(&[msg]);
        assert_eq!(contents[0].role, "model");
        assert_eq!(contents[0].parts.len(), 2);
        assert_eq!(contents[0].parts[0].text.as_deref(), Some("Let me look"));
        let fc = contents[0].parts[1].function_call.as_ref().unwrap();
        assert_eq!(fc.name, "get_files_info");
        assert_eq!(fc.args["directory"], "pkg");
    }

    #[test]
    fn tool_results_become_one_content_with_many_parts() {
        let msg = Message::tool_results(vec![
            ToolResponse {
                name: "write_file".into(),
                output: "Successfully wrote".into(),
            },
            ToolResponse {
                name: "get_file_content".into(),
                output: "the content".into(),
            },
        ]);
        let contents = GeminiProvider::to_contents(&[msg]);
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[0].parts.len(), 2);
        let fr = contents[0].parts[0].function_response.as_ref().unwrap();
        assert_eq!(fr.name, "write_file");
        assert_eq!(fr.response["result"], "Successfully wrote");
    }

    #[test]
    fn declaration_conversion() {
        let decls = GeminiProvider::to_declarations(&[ToolDefinition {
            name: "write_file".into(),
            description: "Write a file".into(),
            parameters: serde_json::json!({"type": "object"}),
        }]);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "write_file");
    }

    #[test]
    fn parse_text_response() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{"content": {"role": "model", "parts": [{"text": "All done."}]}}],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4},
                "modelVersion": "gemini-2.5-flash"
            }"#,
        )
        .unwrap();

        let pr = GeminiProvider::to_provider_response(resp, "gemini-2.5-flash").unwrap();
        assert_eq!(pr.message.content, "All done.");
        assert!(pr.message.tool_calls.is_empty());
        let usage = pr.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.response_tokens, 4);
    }

    #[test]
    fn parse_function_call_response() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{"content": {"role": "model", "parts": [
                    {"functionCall": {"name": "get_file_content", "args": {"file_path": "main.py"}}}
                ]}}],
                "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 9}
            }"#,
        )
        .unwrap();

        let pr = GeminiProvider::to_provider_response(resp, "gemini-2.5-flash").unwrap();
        assert_eq!(pr.message.tool_calls.len(), 1);
        assert_eq!(pr.message.tool_calls[0].name, "get_file_content");
        assert_eq!(pr.message.tool_calls[0].arguments["file_path"], "main.py");
        assert_eq!(pr.model, "gemini-2.5-flash");
    }

    #[test]
    fn missing_usage_metadata_is_a_transport_failure() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "hi"}]}}]}"#,
        )
        .unwrap();

        let err = GeminiProvider::to_provider_response(resp, "gemini-2.5-flash").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
        assert!(err.to_string().contains("usage metadata"));
    }

    #[test]
    fn missing_candidates_is_a_transport_failure() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"usageMetadata": {"promptTokenCount": 1, "candidatesTokenCount": 0}}"#,
        )
        .unwrap();

        let err = GeminiProvider::to_provider_response(resp, "gemini-2.5-flash").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
