//! The assistant facade: what the CLI talks to.

use std::sync::Arc;

use nova_llm::{KnowledgeBackend, LlmBackend, ProviderKeys};
use nova_skills::{Launcher, SkillContext, SkillFactory, builtin_catalogue};
use nova_store::MemoryStore;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::NovaConfig;
use crate::error::NovaResult;
use crate::registry::{InitError, SkillRegistry};
use crate::router::{CommandRouter, Dispatch};
use crate::speech::{Speaker, speaker_from_config};
use crate::status::StatusReport;

/// Owns the memory store, the registry and the router for one session.
pub struct Assistant {
    config: NovaConfig,
    session_id: String,
    router: CommandRouter,
    speaker: Option<Arc<dyn Speaker>>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("name", &self.config.assistant.name)
            .field("session_id", &self.session_id)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    pub fn builder(config: NovaConfig) -> AssistantBuilder {
        AssistantBuilder::new(config)
    }

    /// Build with everything derived from `config` and the environment.
    pub async fn new(config: NovaConfig) -> NovaResult<Self> {
        Self::builder(config).build().await
    }

    /// Answer one input. Never fails; see [`CommandRouter::handle`].
    pub async fn handle(&self, text: &str) -> String {
        self.handle_detailed(text).await.response
    }

    /// Like [`Assistant::handle`], also reporting the route taken.
    pub async fn handle_detailed(&self, text: &str) -> Dispatch {
        self.router.handle(&self.session_id, text).await
    }

    /// Speak `text` aloud. `false` when speech is off or failed.
    pub async fn speak(&self, text: &str) -> bool {
        let Some(speaker) = &self.speaker else {
            return false;
        };
        match speaker.speak(text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "speech failed");
                false
            }
        }
    }

    pub async fn status_report(&self) -> StatusReport {
        self.router.status_report(&self.session_id).await
    }

    /// Delete this session's conversation turns. Preferences are kept.
    pub async fn clear_memory(&self) -> NovaResult<usize> {
        let removed = self.memory().clear(&self.session_id).await?;
        info!(session_id = %self.session_id, removed, "memory cleared");
        Ok(removed)
    }

    pub fn memory(&self) -> &MemoryStore {
        self.router.memory()
    }

    pub fn initialization_errors(&self) -> &[InitError] {
        self.router.registry().errors()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn name(&self) -> &str {
        &self.config.assistant.name
    }

    pub fn config(&self) -> &NovaConfig {
        &self.config
    }

    pub fn registry(&self) -> &SkillRegistry {
        self.router.registry()
    }

    pub fn speech_enabled(&self) -> bool {
        self.speaker.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Builder
// ═══════════════════════════════════════════════════════════════════════

/// Assembles an [`Assistant`], letting callers replace any collaborator.
///
/// Unset collaborators come from the config: the store at
/// `assistant.database_path`, the backend from the environment's API keys,
/// the speaker from `[speech]`, and the built-in skill catalogue.
pub struct AssistantBuilder {
    config: NovaConfig,
    session_id: Option<String>,
    memory: Option<MemoryStore>,
    catalogue: Option<Vec<SkillFactory>>,
    launcher: Option<Arc<dyn Launcher>>,
    backend: Option<Option<Arc<dyn KnowledgeBackend>>>,
    provider_keys: Option<ProviderKeys>,
    speaker: Option<Option<Arc<dyn Speaker>>>,
}

impl AssistantBuilder {
    fn new(config: NovaConfig) -> Self {
        Self {
            config,
            session_id: None,
            memory: None,
            catalogue: None,
            launcher: None,
            backend: None,
            provider_keys: None,
            speaker: None,
        }
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn with_memory(mut self, memory: MemoryStore) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Replace the built-in skill catalogue.
    #[must_use]
    pub fn with_catalogue(mut self, catalogue: Vec<SkillFactory>) -> Self {
        self.catalogue = Some(catalogue);
        self
    }

    #[must_use]
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Use this backend (or none) instead of one built from API keys.
    #[must_use]
    pub fn with_backend(mut self, backend: Option<Arc<dyn KnowledgeBackend>>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_provider_keys(mut self, keys: ProviderKeys) -> Self {
        self.provider_keys = Some(keys);
        self
    }

    #[must_use]
    pub fn with_speaker(mut self, speaker: Option<Arc<dyn Speaker>>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub async fn build(self) -> NovaResult<Assistant> {
        let config = self.config;
        let mut startup_errors = Vec::new();

        let memory = match self.memory {
            Some(memory) => memory,
            None => match MemoryStore::open(&config.assistant.database_path).await {
                Ok(memory) => memory,
                Err(e) => {
                    error!(
                        path = %config.assistant.database_path.display(),
                        error = %e,
                        "memory store unavailable, falling back to in-memory storage"
                    );
                    startup_errors.push(InitError {
                        skill: "memory_store".into(),
                        reason: e.to_string(),
                    });
                    MemoryStore::in_memory().await?
                }
            },
        };

        if config.memory.retention_days > 0 {
            match memory.prune_older_than(config.memory.retention_days).await {
                Ok(0) => {}
                Ok(pruned) => info!(pruned, days = config.memory.retention_days, "old turns pruned"),
                Err(e) => warn!(error = %e, "pruning old turns failed"),
            }
        }

        let session_id = self
            .session_id
            .or_else(|| config.assistant.session_id.clone())
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let backend = match self.backend {
            Some(backend) => backend,
            None => {
                let keys = self.provider_keys.unwrap_or_else(ProviderKeys::from_env);
                match LlmBackend::from_settings(&config.backend_settings(), &keys) {
                    Ok(backend) => backend,
                    Err(e) => {
                        warn!(error = %e, "knowledge backend unavailable");
                        startup_errors.push(InitError {
                            skill: "knowledge_backend".into(),
                            reason: e.to_string(),
                        });
                        None
                    }
                }
            }
        };

        let speaker = self
            .speaker
            .unwrap_or_else(|| speaker_from_config(&config.speech));

        let mut ctx = SkillContext::new(memory.clone(), session_id.clone())
            .with_backend(backend.clone())
            .with_settings(config.skill_settings());
        if let Some(launcher) = self.launcher {
            ctx = ctx.with_launcher(launcher);
        }

        let catalogue = self.catalogue.unwrap_or_else(builtin_catalogue);
        let mut registry = SkillRegistry::build(catalogue, &config.features, &ctx);
        for error in startup_errors {
            registry.push_error(error);
        }

        let router = CommandRouter::new(
            registry,
            memory,
            config.consent,
            config.assistant.name.clone(),
        )?
        .with_backend(backend)
        .with_speech(speaker.as_ref().map(|s| s.describe()));

        info!(
            name = %config.assistant.name,
            session_id = %session_id,
            skills = router.registry().len(),
            "assistant ready"
        );

        Ok(Assistant {
            config,
            session_id,
            router,
            speaker,
        })
    }
}
