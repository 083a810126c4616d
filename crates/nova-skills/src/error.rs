//! Error types for the skills subsystem.

use nova_llm::LlmError;
use nova_store::StoreError;

/// Skill construction and routing errors.
///
/// The router treats any error from [`crate::Skill::route`] as a decline, so
/// these never reach the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("skill `{skill}` is unavailable: {reason}")]
    Unavailable { skill: &'static str, reason: String },

    #[error("{action} failed: {reason}")]
    ActionFailed { action: String, reason: String },

    #[error("{action} timed out after {seconds}s")]
    Timeout { action: String, seconds: u64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("memory store error: {0}")]
    Store(#[from] StoreError),

    #[error("knowledge backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias.
pub type SkillResult<T> = std::result::Result<T, SkillError>;
