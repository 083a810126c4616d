//! Nova configuration.
//!
//! One immutable [`NovaConfig`] is read at startup from
//! `config/default.toml` (or `--config`). Every field has a default, so a
//! missing file or a missing section yields the built-in behaviour. API keys
//! are never read from the file; they come from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nova_llm::{BackendSettings, LlmProvider, ProviderKeys};
use nova_skills::{ConsentFlags, SkillSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{NovaError, NovaResult};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Session used when neither the config nor the caller names one.
pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NovaConfig {
    pub assistant: AssistantConfig,
    pub features: FeatureToggles,
    pub consent: ConsentFlags,
    pub llm: LlmConfig,
    pub safety: SafetyConfig,
    pub memory: MemoryConfig,
    pub speech: SpeechConfig,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `[assistant]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub name: String,
    /// Session the conversation log is kept under. `None` starts a
    /// fresh, generated session on every run.
    pub session_id: Option<String>,
    pub database_path: PathBuf,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Nova".into(),
            session_id: Some(DEFAULT_SESSION_ID.into()),
            database_path: PathBuf::from("data/nova.db"),
        }
    }
}

/// `[features]`: one toggle per built-in skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub hyper_context: bool,
    pub pc_control: bool,
    pub cross_device: bool,
    pub predictor: bool,
    pub emotion: bool,
    pub dark_web_watch: bool,
    pub threat_mode: bool,
    pub negotiator: bool,
    pub ar_overlay: bool,
    pub voice_style: bool,
    pub doppelganger: bool,
    pub coordinator: bool,
    pub study_companion: bool,
    pub lecture: bool,
    pub knowledge_graph: bool,
    pub exam_prep: bool,
    pub skill_builder: bool,
    pub collab_study: bool,
    pub language_guardian: bool,
    pub deep_research: bool,
    pub life_autopilot: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            hyper_context: true,
            pc_control: false,
            cross_device: false,
            predictor: true,
            emotion: false,
            dark_web_watch: false,
            threat_mode: false,
            negotiator: false,
            ar_overlay: false,
            voice_style: false,
            doppelganger: false,
            coordinator: false,
            study_companion: true,
            lecture: false,
            knowledge_graph: true,
            exam_prep: true,
            skill_builder: true,
            collab_study: false,
            language_guardian: false,
            deep_research: true,
            life_autopilot: false,
        }
    }
}

impl FeatureToggles {
    /// Every built-in skill switched on.
    pub fn all() -> Self {
        Self::from_fn(|_| true)
    }

    /// Every built-in skill switched off.
    pub fn none() -> Self {
        Self::from_fn(|_| false)
    }

    fn from_fn(f: impl Fn(&str) -> bool) -> Self {
        let mut toggles = Self::default();
        for name in nova_skills::BUILTIN_SKILLS {
            if let Some(slot) = toggles.slot_mut(name) {
                *slot = f(name);
            }
        }
        toggles
    }

    /// Toggle for a built-in skill; `None` for names this table doesn't know.
    pub fn enabled(&self, name: &str) -> Option<bool> {
        let value = match name {
            "hyper_context" => self.hyper_context,
            "pc_control" => self.pc_control,
            "cross_device" => self.cross_device,
            "predictor" => self.predictor,
            "emotion" => self.emotion,
            "dark_web_watch" => self.dark_web_watch,
            "threat_mode" => self.threat_mode,
            "negotiator" => self.negotiator,
            "ar_overlay" => self.ar_overlay,
            "voice_style" => self.voice_style,
            "doppelganger" => self.doppelganger,
            "coordinator" => self.coordinator,
            "study_companion" => self.study_companion,
            "lecture" => self.lecture,
            "knowledge_graph" => self.knowledge_graph,
            "exam_prep" => self.exam_prep,
            "skill_builder" => self.skill_builder,
            "collab_study" => self.collab_study,
            "language_guardian" => self.language_guardian,
            "deep_research" => self.deep_research,
            "life_autopilot" => self.life_autopilot,
            _ => return None,
        };
        Some(value)
    }

    /// Builder-style toggle. Unknown names are ignored.
    #[must_use]
    pub fn with(mut self, name: &str, enabled: bool) -> Self {
        if let Some(slot) = self.slot_mut(name) {
            *slot = enabled;
        }
        self
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut bool> {
        Some(match name {
            "hyper_context" => &mut self.hyper_context,
            "pc_control" => &mut self.pc_control,
            "cross_device" => &mut self.cross_device,
            "predictor" => &mut self.predictor,
            "emotion" => &mut self.emotion,
            "dark_web_watch" => &mut self.dark_web_watch,
            "threat_mode" => &mut self.threat_mode,
            "negotiator" => &mut self.negotiator,
            "ar_overlay" => &mut self.ar_overlay,
            "voice_style" => &mut self.voice_style,
            "doppelganger" => &mut self.doppelganger,
            "coordinator" => &mut self.coordinator,
            "study_companion" => &mut self.study_companion,
            "lecture" => &mut self.lecture,
            "knowledge_graph" => &mut self.knowledge_graph,
            "exam_prep" => &mut self.exam_prep,
            "skill_builder" => &mut self.skill_builder,
            "collab_study" => &mut self.collab_study,
            "language_guardian" => &mut self.language_guardian,
            "deep_research" => &mut self.deep_research,
            "life_autopilot" => &mut self.life_autopilot,
            _ => return None,
        })
    }
}

/// `[llm]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub default_provider: LlmProvider,
    pub openai_model: String,
    pub anthropic_model: String,
    /// OpenAI-compatible gateway, e.g. a local server.
    pub openai_base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let defaults = BackendSettings::default();
        Self {
            default_provider: defaults.default_provider,
            openai_model: defaults.openai_model,
            anthropic_model: defaults.anthropic_model,
            openai_base_url: defaults.openai_base_url,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

/// `[safety]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub block_real_person_impersonation: bool,
    pub os_action_timeout_secs: u64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            block_real_person_impersonation: true,
            os_action_timeout_secs: 10,
        }
    }
}

/// `[memory]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Turns older than this are pruned at startup; 0 keeps everything.
    pub retention_days: u32,
}

/// `[speech]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// TTS program; `espeak` on Linux and `say` on macOS when unset.
    pub command: Option<String>,
    /// Words per minute.
    pub rate: u32,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: None,
            rate: 175,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl NovaConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> NovaResult<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Self = toml::from_str(&content).map_err(|source| NovaError::ConfigParse {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> NovaResult<Self> {
        toml::from_str(content).map_err(|source| NovaError::ConfigParse {
            path: "<inline>".into(),
            source,
        })
    }

    /// Human-readable warnings about questionable settings.
    pub fn validate(&self, keys: &ProviderKeys) -> Vec<String> {
        let mut warnings = Vec::new();
        if keys.is_empty() {
            warnings.push(
                "no OPENAI_API_KEY or ANTHROPIC_API_KEY set; general questions will not be answered"
                    .to_string(),
            );
        }
        if self.assistant.name.trim().is_empty() {
            warnings.push("assistant.name is empty".to_string());
        }
        if self.features.life_autopilot && !self.consent.device_actions {
            warnings.push(
                "life_autopilot is enabled but consent.device_actions is false; it will refuse"
                    .to_string(),
            );
        }
        if self.features.pc_control && !self.consent.device_actions {
            warnings.push(
                "pc_control is enabled but consent.device_actions is false; it will refuse"
                    .to_string(),
            );
        }
        if self.llm.timeout_secs == 0 {
            warnings.push("llm.timeout_secs is 0; every backend call will time out".to_string());
        }
        if self.safety.os_action_timeout_secs == 0 {
            warnings.push(
                "safety.os_action_timeout_secs is 0; every OS action will time out".to_string(),
            );
        }
        if self.speech.enabled && self.speech.timeout_secs == 0 {
            warnings.push("speech.timeout_secs is 0; speech will always fail".to_string());
        }
        warnings
    }

    /// Backend settings derived from `[llm]` and the assistant name.
    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            default_provider: self.llm.default_provider,
            openai_model: self.llm.openai_model.clone(),
            anthropic_model: self.llm.anthropic_model.clone(),
            openai_base_url: self.llm.openai_base_url.clone(),
            max_tokens: self.llm.max_tokens,
            temperature: self.llm.temperature,
            timeout: Duration::from_secs(self.llm.timeout_secs),
            assistant_name: self.assistant.name.clone(),
        }
    }

    /// Skill settings derived from `[safety]`.
    pub fn skill_settings(&self) -> SkillSettings {
        SkillSettings {
            os_action_timeout: Duration::from_secs(self.safety.os_action_timeout_secs),
            block_real_person_impersonation: self.safety.block_real_person_impersonation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = NovaConfig::from_toml_str("").unwrap();
        assert_eq!(config.assistant.name, "Nova");
        assert_eq!(config.features, FeatureToggles::default());
        assert_eq!(config.consent, ConsentFlags::default());
        assert_eq!(config.llm.max_tokens, 4000);
        assert_eq!(config.llm.timeout_secs, 30);
        assert!(config.safety.block_real_person_impersonation);
        assert_eq!(config.memory.retention_days, 0);
        assert!(!config.speech.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = NovaConfig::from_toml_str(
            r#"
            [assistant]
            name = "Vega"

            [features]
            pc_control = true
            predictor = false

            [consent]
            device_actions = true

            [llm]
            default_provider = "anthropic"
            "#,
        )
        .unwrap();
        assert_eq!(config.assistant.name, "Vega");
        assert_eq!(config.assistant.database_path, PathBuf::from("data/nova.db"));
        assert_eq!(config.features.enabled("pc_control"), Some(true));
        assert_eq!(config.features.enabled("predictor"), Some(false));
        assert_eq!(config.features.enabled("study_companion"), Some(true));
        assert!(config.consent.device_actions);
        assert!(!config.consent.payments);
        assert_eq!(config.llm.default_provider, LlmProvider::Anthropic);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped =
            NovaConfig::from_toml_str(include_str!("../../../config/default.toml")).unwrap();
        let defaults = NovaConfig::default();
        assert_eq!(shipped.features, defaults.features);
        assert_eq!(shipped.consent, defaults.consent);
        assert_eq!(shipped.assistant.database_path, defaults.assistant.database_path);
        assert_eq!(shipped.assistant.session_id, defaults.assistant.session_id);
        assert_eq!(shipped.assistant.session_id.as_deref(), Some(DEFAULT_SESSION_ID));
        assert_eq!(shipped.llm.default_provider, defaults.llm.default_provider);
        assert_eq!(shipped.llm.timeout_secs, defaults.llm.timeout_secs);
        assert_eq!(
            shipped.safety.os_action_timeout_secs,
            defaults.safety.os_action_timeout_secs
        );
        assert_eq!(shipped.speech.rate, defaults.speech.rate);
        assert!(!shipped.speech.enabled);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            NovaConfig::from_toml_str("[features\npc_control = yes"),
            Err(NovaError::ConfigParse { .. })
        ));
    }

    #[test]
    fn toggles_cover_every_builtin() {
        let all = FeatureToggles::all();
        let none = FeatureToggles::none();
        for name in nova_skills::BUILTIN_SKILLS {
            assert_eq!(all.enabled(name), Some(true), "{name}");
            assert_eq!(none.enabled(name), Some(false), "{name}");
        }
        assert_eq!(all.enabled("custom"), None);
        assert_eq!(none.with("emotion", true).enabled("emotion"), Some(true));
    }

    #[test]
    fn validate_flags_risky_settings() {
        let mut config = NovaConfig::default();
        config.features.life_autopilot = true;
        config.llm.timeout_secs = 0;

        let warnings = config.validate(&ProviderKeys::default());
        assert!(warnings.iter().any(|w| w.contains("OPENAI_API_KEY")));
        assert!(warnings.iter().any(|w| w.contains("life_autopilot")));
        assert!(warnings.iter().any(|w| w.contains("llm.timeout_secs")));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NovaConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.assistant.name, "Nova");
    }
}
