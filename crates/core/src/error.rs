//! Error types for the burrow domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Two tiers exist by
//! design: tool-level failures are *conversational* (rendered into the
//! conversation as `"Error: ..."` result strings so the model can recover),
//! while provider failures are *fatal* and abort the session.

use thiserror::Error;

/// The top-level error type for all burrow operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to the model backend. Always fatal: the loop never
/// retries a transport failure because the conversation state can no
/// longer be trusted.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Structural tool failures that surface at the dispatch boundary.
///
/// Operational failures (bad path, missing file, timeout) never appear
/// here — tools render those into their result string. These variants
/// cover the cases the tool body never sees: a name with no registered
/// implementation, or arguments that don't match the declared schema.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown function: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
