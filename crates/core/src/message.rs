//! Message and Conversation domain types.
//!
//! A conversation is the single piece of mutable state the agent loop owns:
//! an append-only sequence of turns. Each turn is either user text, a model
//! turn (text and/or tool-call requests), or the batched tool results for
//! one round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user — also the role tool results are delivered under.
    User,
    /// The model.
    Model,
}

/// A tool invocation requested by the model.
///
/// Exists only within one loop round: produced by the provider, consumed
/// by dispatch, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke.
    pub name: String,

    /// Arguments as a JSON object.
    pub arguments: serde_json::Value,
}

/// The envelope associating one tool's string result with its originating
/// tool name, for insertion back into the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// The tool this result came from.
    pub name: String,

    /// The result text. Operational failures arrive here as
    /// `"Error: ..."` strings, not as transport errors.
    pub output: String,
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID.
    pub id: String,

    /// Who produced this turn.
    pub role: Role,

    /// The text content (may be empty on a pure tool-call turn).
    pub content: String,

    /// Tool invocations requested by the model (if any).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Tool result envelopes for one round, in the order the model issued
    /// the calls. Non-empty only on the batched results turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_results: Vec<ToolResponse>,

    /// Timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a model turn with optional tool-call requests.
    pub fn model(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Model,
            content: content.into(),
            tool_calls,
            tool_results: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create the single turn carrying all tool results of one round.
    ///
    /// Delivered under the user role — the model reads tool output the
    /// same way it reads user input.
    pub fn tool_results(results: Vec<ToolResponse>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: String::new(),
            tool_calls: Vec::new(),
            tool_results: results,
            timestamp: Utc::now(),
        }
    }

    /// Whether this turn requests any tool invocations.
    pub fn requests_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// An ordered, append-only sequence of turns. Grows monotonically within
/// one CLI invocation; discarded at process exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID.
    pub id: ConversationId,

    /// Ordered turns.
    pub messages: Vec<Message>,

    /// When this conversation was created.
    pub created_at: DateTime<Utc>,

    /// When the last turn was appended.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn to the conversation.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("List the files please");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "List the files please");
        assert!(!msg.requests_tools());
    }

    #[test]
    fn model_turn_with_calls_requests_tools() {
        let msg = Message::model(
            "",
            vec![ToolCall {
                name: "get_files_info".into(),
                arguments: serde_json::json!({}),
            }],
        );
        assert_eq!(msg.role, Role::Model);
        assert!(msg.requests_tools());
    }

    #[test]
    fn tool_results_turn_has_user_role() {
        let msg = Message::tool_results(vec![ToolResponse {
            name: "get_file_content".into(),
            output: "hello".into(),
        }]);
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.tool_results.len(), 1);
        assert!(!msg.requests_tools());
    }

    #[test]
    fn conversation_is_append_only_ordered() {
        let mut conv = Conversation::new();
        let created = conv.created_at;

        conv.push(Message::user("first"));
        conv.push(Message::model("second", vec![]));
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].content, "first");
        assert_eq!(conv.messages[1].content, "second");
        assert!(conv.updated_at >= created);
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::model(
            "checking",
            vec![ToolCall {
                name: "write_file".into(),
                arguments: serde_json::json!({"file_path": "a.txt", "content": "x"}),
            }],
        );
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, "checking");
        assert_eq!(back.tool_calls.len(), 1);
        assert_eq!(back.tool_calls[0].name, "write_file");
    }
}
