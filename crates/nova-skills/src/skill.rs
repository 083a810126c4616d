//! The skill handler contract.
//!
//! Every capability Nova routes to implements [`Skill`]. A skill sees the
//! user's text (trimmed, original case) only after one of its trigger
//! phrases matched, and answers with `Some(response)` or declines with
//! `None`. Skills may keep private state and write preferences through the
//! [`SkillContext`]'s memory store, but never write conversation turns.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use nova_llm::KnowledgeBackend;
use nova_store::MemoryStore;
use serde::{Deserialize, Serialize};

use crate::device::launcher::Launcher;
use crate::error::{SkillError, SkillResult};

// ---------------------------------------------------------------------------
// Categories and consent
// ---------------------------------------------------------------------------

/// Dispatch group. Declaration order is dispatch priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Device,
    Security,
    Advanced,
    Study,
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::Security => write!(f, "security"),
            Self::Advanced => write!(f, "advanced"),
            Self::Study => write!(f, "study"),
        }
    }
}

/// A sensitive capability the user must opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentKind {
    /// Launching, closing or scheduling things on the user's devices.
    DeviceActions,
    /// Anything that could spend money.
    Payments,
    /// Listening to or recording audio and video.
    Recording,
    /// Adapting output to imitate a speaking style.
    StyleAdapt,
}

impl ConsentKind {
    /// Key under `[consent]` in the config file.
    pub fn config_key(self) -> &'static str {
        match self {
            Self::DeviceActions => "device_actions",
            Self::Payments => "payments",
            Self::Recording => "recording",
            Self::StyleAdapt => "style_adapt",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::DeviceActions => "actions on your devices",
            Self::Payments => "payments and purchases",
            Self::Recording => "audio and video recording",
            Self::StyleAdapt => "voice style adaptation",
        }
    }
}

/// Which sensitive capabilities the user has approved. All default to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentFlags {
    pub device_actions: bool,
    pub payments: bool,
    pub recording: bool,
    pub style_adapt: bool,
}

impl ConsentFlags {
    /// Every consent granted.
    pub fn all() -> Self {
        Self {
            device_actions: true,
            payments: true,
            recording: true,
            style_adapt: true,
        }
    }

    pub fn granted(&self, kind: ConsentKind) -> bool {
        match kind {
            ConsentKind::DeviceActions => self.device_actions,
            ConsentKind::Payments => self.payments,
            ConsentKind::Recording => self.recording,
            ConsentKind::StyleAdapt => self.style_adapt,
        }
    }

    /// Builder-style grant.
    #[must_use]
    pub fn with(mut self, kind: ConsentKind) -> Self {
        match kind {
            ConsentKind::DeviceActions => self.device_actions = true,
            ConsentKind::Payments => self.payments = true,
            ConsentKind::Recording => self.recording = true,
            ConsentKind::StyleAdapt => self.style_adapt = true,
        }
        self
    }
}

/// The fixed refusal returned when `kind` has not been granted.
pub fn consent_refusal(skill_title: &str, kind: ConsentKind) -> String {
    format!(
        "🔒 {skill_title} needs your consent for {}. Set `{} = true` under [consent] \
         in your Nova config to enable it.",
        kind.describe(),
        kind.config_key()
    )
}

// ---------------------------------------------------------------------------
// The trait
// ---------------------------------------------------------------------------

/// A routable capability.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Unique registry name, matching the feature toggle key.
    fn name(&self) -> &'static str;

    /// Lowercase phrases; any occurrence in the lowercased input makes this
    /// skill a dispatch candidate.
    fn triggers(&self) -> &[&'static str];

    /// Consent required before [`Skill::route`] may run.
    fn required_consent(&self) -> Option<ConsentKind> {
        None
    }

    /// Text returned instead of routing when consent is missing.
    fn consent_refusal(&self) -> String {
        match self.required_consent() {
            Some(kind) => consent_refusal(self.name(), kind),
            None => String::new(),
        }
    }

    /// Handle `text` or decline with `Ok(None)`.
    ///
    /// The router only calls this once the required consent is granted.
    /// Errors are logged by the router and treated as a decline.
    async fn route(&self, text: &str, consent: &ConsentFlags) -> SkillResult<Option<String>>;
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Per-skill knobs read from configuration.
#[derive(Debug, Clone)]
pub struct SkillSettings {
    /// Upper bound on any OS process a skill spawns and waits for.
    pub os_action_timeout: Duration,
    pub block_real_person_impersonation: bool,
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            os_action_timeout: Duration::from_secs(10),
            block_real_person_impersonation: true,
        }
    }
}

/// Shared collaborators handed to every skill constructor.
#[derive(Clone)]
pub struct SkillContext {
    pub memory: MemoryStore,
    pub backend: Option<Arc<dyn KnowledgeBackend>>,
    /// Overrides the platform launcher (tests inject a recorder).
    pub launcher: Option<Arc<dyn Launcher>>,
    pub session_id: String,
    pub settings: SkillSettings,
}

impl fmt::Debug for SkillContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillContext")
            .field("session_id", &self.session_id)
            .field("backend", &self.backend.as_ref().map(|b| b.describe()))
            .field("custom_launcher", &self.launcher.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SkillContext {
    pub fn new(memory: MemoryStore, session_id: impl Into<String>) -> Self {
        Self {
            memory,
            backend: None,
            launcher: None,
            session_id: session_id.into(),
            settings: SkillSettings::default(),
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Option<Arc<dyn KnowledgeBackend>>) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SkillSettings) -> Self {
        self.settings = settings;
        self
    }
}

type BuildFn = Box<dyn FnOnce(&SkillContext) -> SkillResult<Arc<dyn Skill>> + Send>;

/// A named, categorised constructor for one skill.
pub struct SkillFactory {
    pub name: &'static str,
    pub category: SkillCategory,
    build: BuildFn,
}

impl fmt::Debug for SkillFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillFactory")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

impl SkillFactory {
    pub fn new<F>(name: &'static str, category: SkillCategory, build: F) -> Self
    where
        F: FnOnce(&SkillContext) -> SkillResult<Arc<dyn Skill>> + Send + 'static,
    {
        Self {
            name,
            category,
            build: Box::new(build),
        }
    }

    /// Run the constructor.
    pub fn build(self, ctx: &SkillContext) -> SkillResult<Arc<dyn Skill>> {
        (self.build)(ctx)
    }
}

/// Lock a skill's private state.
pub(crate) fn lock_state<T>(state: &Mutex<T>) -> SkillResult<MutexGuard<'_, T>> {
    state
        .lock()
        .map_err(|e| SkillError::Internal(format!("state lock poisoned: {e}")))
}
