//! Nova's core: configuration, the skill registry, the command router and
//! the [`Assistant`] facade.
//!
//! ```text
//!   CLI ─► Assistant::handle ─► CommandRouter
//!                                 ├─ system keywords ─► StatusReport
//!                                 ├─ SkillRegistry (ordered) ─► Skill::route
//!                                 └─ KnowledgeBackend
//!                               ─► MemoryStore::record_exchange
//! ```

pub mod assistant;
pub mod config;
pub mod error;
pub mod registry;
pub mod router;
pub mod speech;
pub mod status;

pub use assistant::{Assistant, AssistantBuilder};
pub use config::{
    AssistantConfig, DEFAULT_CONFIG_PATH, DEFAULT_SESSION_ID, FeatureToggles, LlmConfig,
    MemoryConfig, NovaConfig, SafetyConfig, SpeechConfig,
};
pub use error::{NovaError, NovaResult};
pub use registry::{InitError, SkillRegistration, SkillRegistry};
pub use router::{
    CommandRouter, Dispatch, EMPTY_INPUT_PROMPT, INTERNAL_ERROR_REPLY, KNOWLEDGE_UNAVAILABLE_REPLY,
    NO_BACKEND_REPLY, RouteKind, SYSTEM_KEYWORDS, UNSURE_REPLY,
};
pub use speech::{CommandSpeaker, Speaker, speaker_from_config};
pub use status::StatusReport;
