//! Knowledge backend error types.

/// Alias for `Result<T, LlmError>`.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors surfaced by the LLM clients and the knowledge backend.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// An HTTP request to the provider failed.
    #[error("llm request failed: {reason}")]
    RequestFailed { reason: String },

    /// The provider's response could not be parsed.
    #[error("llm response parse error: {reason}")]
    ParseFailed { reason: String },

    /// The API key is missing for a provider that requires one.
    #[error("missing api key for provider: {provider}")]
    MissingApiKey { provider: String },

    /// The call did not finish within the configured bound.
    #[error("llm call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Backend settings are unusable.
    #[error("llm config error: {reason}")]
    Config { reason: String },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed {
            reason: err.to_string(),
        }
    }
}
