//! Error types for the assistant core.

use nova_llm::LlmError;
use nova_skills::SkillError;
use nova_store::StoreError;

/// Errors raised while configuring or assembling the assistant.
///
/// [`crate::Assistant::handle`] never returns these; they surface only from
/// construction and maintenance operations.
#[derive(Debug, thiserror::Error)]
pub enum NovaError {
    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid trigger set for skill `{skill}`: {reason}")]
    Triggers { skill: String, reason: String },

    #[error("speech failed: {reason}")]
    Speech { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Skill(#[from] SkillError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias.
pub type NovaResult<T> = std::result::Result<T, NovaError>;
