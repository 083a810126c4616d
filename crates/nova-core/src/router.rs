//! The command router.
//!
//! Per input: trim, answer empty input with a fixed prompt (nothing is
//! logged), then try in order:
//!
//! ```text
//!   system keyword ─► status report
//!   skills (registry order) ─► first non-empty reply wins
//!   knowledge backend ─► answer, or a fixed apology
//! ```
//!
//! Every non-empty input is recorded as exactly one user turn followed by
//! one assistant turn. Nothing escapes [`CommandRouter::handle`]: skill
//! errors and panics count as a decline, and a panic anywhere else becomes
//! a fixed error reply.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use aho_corasick::AhoCorasick;
use futures::FutureExt;
use nova_llm::KnowledgeBackend;
use nova_skills::ConsentFlags;
use nova_store::{MemoryStore, TurnMetadata};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{NovaError, NovaResult};
use crate::registry::{SkillRegistration, SkillRegistry, panic_message};
use crate::status::StatusReport;

// ═══════════════════════════════════════════════════════════════════════
//  Fixed replies
// ═══════════════════════════════════════════════════════════════════════

pub const EMPTY_INPUT_PROMPT: &str = "Please provide a command or question.";

pub const UNSURE_REPLY: &str =
    "I'm not sure about that. Could you rephrase your question or try a more specific command?";

pub const KNOWLEDGE_UNAVAILABLE_REPLY: &str =
    "I'm having trouble accessing my knowledge base right now. Please try again later.";

pub const NO_BACKEND_REPLY: &str = "I'm sorry, but I don't have access to an AI backend right \
     now. Please check your API key configuration.";

pub const INTERNAL_ERROR_REPLY: &str =
    "I encountered an error processing your request. Please try again.";

/// Inputs containing any of these get the status report, ahead of skills.
pub const SYSTEM_KEYWORDS: &[&str] = &["status", "health", "diagnostic"];

// ═══════════════════════════════════════════════════════════════════════
//  Dispatch result
// ═══════════════════════════════════════════════════════════════════════

/// Which path produced a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    /// Blank input; nothing was recorded.
    EmptyInput,
    System,
    Skill {
        name: &'static str,
        /// The skill's consent was missing and its refusal was returned.
        consent_refused: bool,
    },
    Llm,
    Fallback,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty",
            Self::System => "system",
            Self::Skill { .. } => "skill",
            Self::Llm => "llm",
            Self::Fallback => "fallback",
        }
    }

    pub fn skill_name(&self) -> Option<&'static str> {
        match self {
            Self::Skill { name, .. } => Some(*name),
            _ => None,
        }
    }
}

/// A reply and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub response: String,
    pub route: RouteKind,
}

impl Dispatch {
    fn new(response: impl Into<String>, route: RouteKind) -> Self {
        Self {
            response: response.into(),
            route,
        }
    }

    /// Metadata stored with the assistant turn.
    fn metadata(&self) -> TurnMetadata {
        let mut meta = TurnMetadata::new();
        meta.insert("route".into(), Value::from(self.route.as_str()));
        if let RouteKind::Skill {
            name,
            consent_refused,
        } = self.route
        {
            meta.insert("skill".into(), Value::from(name));
            if consent_refused {
                meta.insert("consent_refused".into(), Value::Bool(true));
            }
        }
        meta
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Router
// ═══════════════════════════════════════════════════════════════════════

pub struct CommandRouter {
    registry: SkillRegistry,
    memory: MemoryStore,
    backend: Option<Arc<dyn KnowledgeBackend>>,
    consent: ConsentFlags,
    assistant_name: String,
    speech: Option<String>,
    system_matcher: AhoCorasick,
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("assistant_name", &self.assistant_name)
            .field("skills", &self.registry.names())
            .field("backend", &self.backend.as_ref().map(|b| b.describe()))
            .field("consent", &self.consent)
            .finish_non_exhaustive()
    }
}

impl CommandRouter {
    pub fn new(
        registry: SkillRegistry,
        memory: MemoryStore,
        consent: ConsentFlags,
        assistant_name: impl Into<String>,
    ) -> NovaResult<Self> {
        let system_matcher =
            AhoCorasick::new(SYSTEM_KEYWORDS).map_err(|e| NovaError::Triggers {
                skill: "system".into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            registry,
            memory,
            backend: None,
            consent,
            assistant_name: assistant_name.into(),
            speech: None,
            system_matcher,
        })
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Option<Arc<dyn KnowledgeBackend>>) -> Self {
        self.backend = backend;
        self
    }

    /// Speech engine description shown in the status report.
    #[must_use]
    pub fn with_speech(mut self, speech: Option<String>) -> Self {
        self.speech = speech;
        self
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn consent(&self) -> &ConsentFlags {
        &self.consent
    }

    /// Route one input and record the exchange.
    #[instrument(skip_all, fields(session_id = %session_id, chars = text.len()))]
    pub async fn handle(&self, session_id: &str, text: &str) -> Dispatch {
        let text = text.trim();
        if text.is_empty() {
            return Dispatch::new(EMPTY_INPUT_PROMPT, RouteKind::EmptyInput);
        }

        let dispatch = match AssertUnwindSafe(self.dispatch(session_id, text))
            .catch_unwind()
            .await
        {
            Ok(dispatch) => dispatch,
            Err(panic) => {
                error!(panic = %panic_message(panic.as_ref()), "routing panicked");
                Dispatch::new(INTERNAL_ERROR_REPLY, RouteKind::Fallback)
            }
        };

        self.record(session_id, text, &dispatch).await;
        info!(route = dispatch.route.as_str(), skill = ?dispatch.route.skill_name(), "handled");
        dispatch
    }

    /// The status report for `session_id`.
    pub async fn status_report(&self, session_id: &str) -> StatusReport {
        let memory = match self.memory.stats(session_id).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(error = %e, "memory stats unavailable");
                None
            }
        };
        StatusReport {
            assistant_name: self.assistant_name.clone(),
            store_durable: self.memory.database().is_durable(),
            backend: self.backend.as_ref().map(|b| b.describe()),
            speech: self.speech.clone(),
            active_skills: self.registry.len(),
            catalogue_size: self.registry.catalogue_size(),
            init_errors: self.registry.errors().iter().map(ToString::to_string).collect(),
            memory,
        }
    }

    async fn dispatch(&self, session_id: &str, text: &str) -> Dispatch {
        let lowered = text.to_lowercase();

        if self.system_matcher.is_match(&lowered) {
            let report = self.status_report(session_id).await;
            return Dispatch::new(report.to_string(), RouteKind::System);
        }

        for registration in self.registry.candidates(&lowered) {
            if let Some(dispatch) = self.try_skill(registration, text).await {
                return dispatch;
            }
        }

        self.ask_backend(text).await
    }

    /// Offer `text` to one skill. `None` means it declined.
    async fn try_skill(&self, registration: &SkillRegistration, text: &str) -> Option<Dispatch> {
        let name = registration.name;

        if let Some(kind) = registration.consent
            && !self.consent.granted(kind)
        {
            debug!(skill = name, consent = kind.config_key(), "consent missing");
            return Some(Dispatch::new(
                registration.skill().consent_refusal(),
                RouteKind::Skill {
                    name,
                    consent_refused: true,
                },
            ));
        }

        let routed = AssertUnwindSafe(registration.skill().route(text, &self.consent))
            .catch_unwind()
            .await;
        match routed {
            Ok(Ok(Some(reply))) if !reply.trim().is_empty() => Some(Dispatch::new(
                reply,
                RouteKind::Skill {
                    name,
                    consent_refused: false,
                },
            )),
            Ok(Ok(_)) => {
                debug!(skill = name, "skill declined");
                None
            }
            Ok(Err(e)) => {
                warn!(skill = name, error = %e, "skill failed, treating as no match");
                None
            }
            Err(panic) => {
                error!(skill = name, panic = %panic_message(panic.as_ref()), "skill panicked, treating as no match");
                None
            }
        }
    }

    async fn ask_backend(&self, text: &str) -> Dispatch {
        let Some(backend) = &self.backend else {
            return Dispatch::new(NO_BACKEND_REPLY, RouteKind::Fallback);
        };
        match backend.get_answer(text).await {
            Ok(answer) if !answer.trim().is_empty() => Dispatch::new(answer.trim(), RouteKind::Llm),
            Ok(_) => Dispatch::new(UNSURE_REPLY, RouteKind::Fallback),
            Err(e) => {
                warn!(backend = %backend.describe(), error = %e, "knowledge backend failed");
                Dispatch::new(KNOWLEDGE_UNAVAILABLE_REPLY, RouteKind::Fallback)
            }
        }
    }

    /// Storage failures are logged and never reach the user.
    async fn record(&self, session_id: &str, text: &str, dispatch: &Dispatch) {
        if let Err(e) = self
            .memory
            .record_exchange(
                session_id,
                text,
                TurnMetadata::new(),
                &dispatch.response,
                dispatch.metadata(),
            )
            .await
        {
            error!(error = %e, "failed to record exchange");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_names_route_and_skill() {
        let dispatch = Dispatch::new(
            "🔒 no",
            RouteKind::Skill {
                name: "pc_control",
                consent_refused: true,
            },
        );
        let meta = dispatch.metadata();
        assert_eq!(meta["route"], "skill");
        assert_eq!(meta["skill"], "pc_control");
        assert_eq!(meta["consent_refused"], true);

        let meta = Dispatch::new("hi", RouteKind::Llm).metadata();
        assert_eq!(meta["route"], "llm");
        assert!(!meta.contains_key("skill"));
    }

    #[test]
    fn fixed_replies_are_distinct() {
        let replies = [
            EMPTY_INPUT_PROMPT,
            UNSURE_REPLY,
            KNOWLEDGE_UNAVAILABLE_REPLY,
            NO_BACKEND_REPLY,
            INTERNAL_ERROR_REPLY,
        ];
        for (i, a) in replies.iter().enumerate() {
            for b in &replies[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
