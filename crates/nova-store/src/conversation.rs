//! Conversation log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Metadata attached to a turn (word counts, routing info).
pub type TurnMetadata = serde_json::Map<String, serde_json::Value>;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub(crate) fn parse(s: &str) -> StoreResult<Self> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(StoreError::Corrupt {
                entity: "conversation",
                reason: format!("unknown role: {other}"),
            }),
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: i64,
    pub session_id: String,
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: TurnMetadata,
}

impl ConversationTurn {
    /// Number of whitespace-separated words in the content.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Per-session rollup used by `nova sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub turns: u64,
    pub last_activity: DateTime<Utc>,
}

/// Storage figures reported by the status command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Turns recorded for the queried session.
    pub session_turns: u64,
    /// Turns recorded across every session.
    pub total_turns: u64,
    pub size_bytes: u64,
    pub last_interaction: Option<DateTime<Utc>>,
}

impl MemoryStats {
    /// Database size in megabytes, rounded to two places.
    pub fn size_mb(&self) -> f64 {
        (self.size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
    }
}

pub(crate) fn from_millis(entity: &'static str, ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| StoreError::Corrupt {
        entity,
        reason: format!("timestamp out of range: {ms}"),
    })
}
