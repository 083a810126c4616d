//! # nova-store
//!
//! Memory store for Nova (the "digital twin").
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  MemoryStore                                │
//! │    conversation log  (conversations table)  │
//! │    preferences       (preferences table)    │
//! │    analytics         (pure, recomputed)     │
//! ├─────────────────────────────────────────────┤
//! │  Database (rusqlite WAL, one mutex)         │
//! │  Migrations (versioned, transactional)      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ```ignore
//! use nova_store::{MemoryStore, TurnRole, TurnMetadata};
//!
//! let store = MemoryStore::open("data/nova.db").await?;
//! store.record_turn("default", TurnRole::User, "hello", TurnMetadata::new()).await?;
//! println!("{}", store.summarize("default", 24).await?);
//! ```

pub mod analytics;
pub mod conversation;
pub mod db;
pub mod error;
pub mod memory;
pub mod migration;
pub mod preference;

// ── re-exports ───────────────────────────────────────────────────────

pub use analytics::{DerivedStats, EngagementLevel, ExpertiseDomain, ExpertiseLevel, WordCount};
pub use conversation::{ConversationTurn, MemoryStats, SessionInfo, TurnMetadata, TurnRole};
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use preference::{LEARNED_CONFIDENCE, Preference};
