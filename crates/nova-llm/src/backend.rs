//! The knowledge backend: the router's last resort before giving up.
//!
//! [`KnowledgeBackend`] is the seam the rest of Nova depends on; [`LlmBackend`]
//! is the real implementation that wraps an [`LlmClient`] with the persona
//! preamble and a hard timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::{LlmClient, LlmClientConfig, LlmProvider};
use crate::error::{LlmError, LlmResult};
use crate::types::{ChatRequest, Message};

/// Something that can answer a free-text question.
#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    /// Answer `query`. An empty string means "no useful answer".
    async fn get_answer(&self, query: &str) -> LlmResult<String>;

    /// Send `prompt` without the persona preamble.
    ///
    /// Used for structured generation (flashcards) where the preamble would
    /// only add noise. Defaults to [`KnowledgeBackend::get_answer`].
    async fn complete_raw(&self, prompt: &str) -> LlmResult<String> {
        self.get_answer(prompt).await
    }

    /// Short label for status output, e.g. `openai (gpt-4o-mini)`.
    fn describe(&self) -> String;
}

/// Persona and capability preamble sent with every question.
pub fn persona_preamble(name: &str) -> String {
    format!(
        "You are {name}, an advanced AI assistant that combines the helpfulness of a personal \
         assistant with the depth of a study companion.\n\n\
         Guidelines:\n\
         - Be concise and accurate; prefer short paragraphs and lists.\n\
         - Say so plainly when you do not know something.\n\
         - Never claim to have performed an action on the user's devices.\n\
         - Keep a friendly, professional tone.\n\n\
         Capabilities you can mention when relevant: opening apps and websites, study \
         flashcards and quizzes, practice tests, concept maps, learning paths, research \
         outlines, day planning, and security hygiene tips."
    )
}

// ---------------------------------------------------------------------------
// Provider selection
// ---------------------------------------------------------------------------

/// API keys read from the environment. Empty strings count as absent.
#[derive(Clone, Default)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
}

impl std::fmt::Debug for ProviderKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderKeys")
            .field("openai", &self.openai.is_some())
            .field("anthropic", &self.anthropic.is_some())
            .finish()
    }
}

impl ProviderKeys {
    /// Read `OPENAI_API_KEY` and `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            openai: env_non_empty("OPENAI_API_KEY"),
            anthropic: env_non_empty("ANTHROPIC_API_KEY"),
        }
    }

    pub fn key_for(&self, provider: LlmProvider) -> Option<&str> {
        let key = match provider {
            LlmProvider::OpenAI => self.openai.as_deref(),
            LlmProvider::Anthropic => self.anthropic.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.key_for(LlmProvider::OpenAI).is_none() && self.key_for(LlmProvider::Anthropic).is_none()
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Default provider if keyed, else Anthropic, else OpenAI, else none.
pub fn select_provider(default: LlmProvider, keys: &ProviderKeys) -> Option<LlmProvider> {
    [default, LlmProvider::Anthropic, LlmProvider::OpenAI]
        .into_iter()
        .find(|p| keys.key_for(*p).is_some())
}

// ---------------------------------------------------------------------------
// LlmBackend
// ---------------------------------------------------------------------------

/// Tunables for [`LlmBackend`].
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub default_provider: LlmProvider,
    pub openai_model: String,
    pub anthropic_model: String,
    /// OpenAI-compatible gateway; `None` means api.openai.com.
    pub openai_base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub assistant_name: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            default_provider: LlmProvider::OpenAI,
            openai_model: "gpt-4o-mini".into(),
            anthropic_model: "claude-sonnet-4-20250514".into(),
            openai_base_url: None,
            max_tokens: 4000,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            assistant_name: "Nova".into(),
        }
    }
}

/// Knowledge backend over a real provider.
#[derive(Debug, Clone)]
pub struct LlmBackend {
    client: LlmClient,
    preamble: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl LlmBackend {
    pub fn new(client: LlmClient, settings: &BackendSettings) -> Self {
        Self {
            client,
            preamble: persona_preamble(&settings.assistant_name),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: settings.timeout,
        }
    }

    /// Pick a provider from the available keys and build a backend.
    ///
    /// `Ok(None)` means no provider has a key.
    pub fn from_settings(
        settings: &BackendSettings,
        keys: &ProviderKeys,
    ) -> LlmResult<Option<Arc<dyn KnowledgeBackend>>> {
        let Some(provider) = select_provider(settings.default_provider, keys) else {
            warn!("no AI provider key configured; knowledge fallback disabled");
            return Ok(None);
        };
        let key = keys.key_for(provider).unwrap_or_default();

        let config = match provider {
            LlmProvider::Anthropic => LlmClientConfig::anthropic(key, &settings.anthropic_model),
            LlmProvider::OpenAI => match &settings.openai_base_url {
                Some(base) => {
                    LlmClientConfig::openai_compatible(key, &settings.openai_model, base.as_str())
                }
                None => LlmClientConfig::openai(key, &settings.openai_model),
            },
        };

        let client = LlmClient::new(LlmClientConfig {
            max_tokens: settings.max_tokens,
            ..config
        })?;
        info!(provider = %provider, model = client.model(), "knowledge backend ready");
        Ok(Some(Arc::new(Self::new(client, settings))))
    }

    async fn send(&self, messages: Vec<Message>) -> LlmResult<String> {
        let request = ChatRequest {
            messages,
            model: None,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };
        with_timeout(self.timeout, self.client.complete(&request)).await
    }
}

#[async_trait]
impl KnowledgeBackend for LlmBackend {
    async fn get_answer(&self, query: &str) -> LlmResult<String> {
        debug!(chars = query.len(), "asking knowledge backend");
        self.send(vec![
            Message::system(self.preamble.clone()),
            Message::user(query),
        ])
        .await
    }

    async fn complete_raw(&self, prompt: &str) -> LlmResult<String> {
        self.send(vec![Message::user(prompt)]).await
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.client.provider(), self.client.model())
    }
}

/// Run `fut`, failing with [`LlmError::Timeout`] once `limit` elapses.
pub async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = LlmResult<T>>,
) -> LlmResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout {
            seconds: limit.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(openai: Option<&str>, anthropic: Option<&str>) -> ProviderKeys {
        ProviderKeys {
            openai: openai.map(String::from),
            anthropic: anthropic.map(String::from),
        }
    }

    #[test]
    fn default_provider_wins_when_keyed() {
        let k = keys(Some("o"), Some("a"));
        assert_eq!(select_provider(LlmProvider::OpenAI, &k), Some(LlmProvider::OpenAI));
        assert_eq!(
            select_provider(LlmProvider::Anthropic, &k),
            Some(LlmProvider::Anthropic)
        );
    }

    #[test]
    fn falls_back_to_anthropic_then_openai() {
        assert_eq!(
            select_provider(LlmProvider::OpenAI, &keys(None, Some("a"))),
            Some(LlmProvider::Anthropic)
        );
        assert_eq!(
            select_provider(LlmProvider::Anthropic, &keys(Some("o"), None)),
            Some(LlmProvider::OpenAI)
        );
    }

    #[test]
    fn blank_keys_mean_no_provider() {
        let k = keys(Some("  "), Some(""));
        assert!(k.is_empty());
        assert_eq!(select_provider(LlmProvider::OpenAI, &k), None);
        assert!(
            LlmBackend::from_settings(&BackendSettings::default(), &k)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn backend_describes_selected_provider() {
        let backend = LlmBackend::from_settings(&BackendSettings::default(), &keys(None, Some("a")))
            .unwrap()
            .unwrap();
        assert_eq!(backend.describe(), "anthropic (claude-sonnet-4-20250514)");
    }

    #[tokio::test]
    async fn timeout_maps_to_error() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, LlmError>("late".to_string())
        };
        match with_timeout(Duration::from_millis(10), slow).await {
            Err(LlmError::Timeout { .. }) => {}
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[test]
    fn preamble_names_the_assistant() {
        assert!(persona_preamble("Nova").starts_with("You are Nova"));
    }
}
