//! Two-provider chat client.
//!
//! Speaks the Anthropic Messages API and the OpenAI Chat Completions API
//! (which also covers OpenAI-compatible gateways). Only non-streaming text
//! completions are needed here.

use std::fmt;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{LlmError, LlmResult};
use crate::types::{ChatRequest, Message, Role};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Hard ceiling for a single HTTP exchange. The backend applies its own,
/// usually tighter, bound on top.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Which chat API a client targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
}

impl LlmProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> LlmResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            other => Err(LlmError::Config {
                reason: format!("unknown provider: {other}"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Connection settings for one provider endpoint.
#[derive(Clone)]
pub struct LlmClientConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
    pub max_tokens: u32,
}

impl fmt::Debug for LlmClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmClientConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmClientConfig {
    pub fn anthropic(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Anthropic,
            api_key: api_key.into(),
            base_url: ANTHROPIC_BASE_URL.to_owned(),
            default_model: model.into(),
            max_tokens: 4000,
        }
    }

    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_owned(),
            default_model: model.into(),
            max_tokens: 4000,
        }
    }

    /// Any OpenAI-compatible gateway (OpenRouter, Ollama, vLLM).
    pub fn openai_compatible(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            ..Self::openai(api_key, model)
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A chat-completion client bound to one provider.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmClientConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Build a client. An empty API key is rejected up front.
    pub fn new(config: LlmClientConfig) -> LlmResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey {
                provider: config.provider.as_str().into(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    pub fn provider(&self) -> LlmProvider {
        self.config.provider
    }

    pub fn model(&self) -> &str {
        &self.config.default_model
    }

    /// Send a request and return the concatenated text of the reply.
    pub async fn complete(&self, request: &ChatRequest) -> LlmResult<String> {
        let (url, headers, body) = match self.config.provider {
            LlmProvider::Anthropic => (
                format!("{}/v1/messages", self.config.base_url),
                self.anthropic_headers()?,
                self.build_anthropic_body(request),
            ),
            LlmProvider::OpenAI => (
                format!("{}/chat/completions", self.config.base_url),
                self.openai_headers()?,
                self.build_openai_body(request),
            ),
        };

        tracing::debug!(url = %url, model = %body["model"], provider = %self.config.provider, "sending LLM request");

        let resp = self
            .http
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| LlmError::RequestFailed {
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(LlmError::RequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| LlmError::ParseFailed {
            reason: format!("invalid JSON response: {e}"),
        })?;

        match self.config.provider {
            LlmProvider::Anthropic => parse_anthropic_response(&v),
            LlmProvider::OpenAI => parse_openai_response(&v),
        }
    }

    // -- Anthropic -----------------------------------------------------------

    fn anthropic_headers(&self) -> LlmResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.config.api_key).map_err(|e| LlmError::RequestFailed {
                reason: format!("invalid API key header: {e}"),
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_anthropic_body(&self, request: &ChatRequest) -> Value {
        let (system, messages) = messages_to_anthropic(&request.messages);

        let mut body = json!({
            "model": request.model.as_deref().unwrap_or(&self.config.default_model),
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": messages,
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }
        body
    }

    // -- OpenAI --------------------------------------------------------------

    fn openai_headers(&self) -> LlmResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|e| LlmError::RequestFailed {
                reason: format!("invalid authorization header: {e}"),
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_openai_body(&self, request: &ChatRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": request.model.as_deref().unwrap_or(&self.config.default_model),
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": messages,
        });
        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }
        body
    }
}

// ===========================================================================
// Wire format helpers
// ===========================================================================

/// Split out system messages; Anthropic takes them as a top-level field.
fn messages_to_anthropic(messages: &[Message]) -> (Option<String>, Vec<Value>) {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut out = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(&msg.content),
            Role::User | Role::Assistant => {
                out.push(json!({ "role": msg.role.as_str(), "content": msg.content }));
            }
        }
    }

    let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
    (system, out)
}

fn parse_anthropic_response(v: &Value) -> LlmResult<String> {
    let content = v["content"]
        .as_array()
        .ok_or_else(|| LlmError::ParseFailed {
            reason: "missing `content` array in response".into(),
        })?;

    Ok(content
        .iter()
        .filter(|block| block["type"].as_str() == Some("text"))
        .filter_map(|block| block["text"].as_str())
        .collect::<Vec<_>>()
        .join(""))
}

fn parse_openai_response(v: &Value) -> LlmResult<String> {
    let message = &v["choices"][0]["message"];
    if message.is_null() {
        return Err(LlmError::ParseFailed {
            reason: "missing `choices[0].message` in response".into(),
        });
    }
    Ok(message["content"].as_str().unwrap_or_default().to_owned())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![Message::system("be brief"), Message::user("hello")],
            temperature: Some(0.7),
            ..ChatRequest::default()
        }
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = LlmClient::new(LlmClientConfig::openai("  ", "gpt-4o-mini")).unwrap_err();
        match err {
            LlmError::MissingApiKey { provider } => assert_eq!(provider, "openai"),
            other => panic!("expected MissingApiKey, got {other:?}"),
        }
    }

    #[test]
    fn anthropic_body_lifts_system_prompt() {
        let client =
            LlmClient::new(LlmClientConfig::anthropic("sk-test", "claude-sonnet-4-20250514"))
                .unwrap();
        let body = client.build_anthropic_body(&request());

        assert_eq!(body["system"], "be brief");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        assert_eq!(body["max_tokens"], 4000);
    }

    #[test]
    fn openai_body_keeps_system_message_inline() {
        let client = LlmClient::new(LlmClientConfig::openai("sk-test", "gpt-4o-mini")).unwrap();
        let mut req = request();
        req.model = Some("gpt-4o".into());
        let body = client.build_openai_body(&req);

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["model"], "gpt-4o");
    }

    #[test]
    fn compatible_base_url_is_trimmed() {
        let cfg = LlmClientConfig::openai_compatible("k", "m", "https://openrouter.ai/api/v1/");
        assert_eq!(cfg.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(cfg.provider, LlmProvider::OpenAI);
    }

    #[test]
    fn parses_anthropic_text_blocks() {
        let v = json!({
            "content": [
                { "type": "text", "text": "Hello " },
                { "type": "text", "text": "there" }
            ]
        });
        assert_eq!(parse_anthropic_response(&v).unwrap(), "Hello there");
        assert!(parse_anthropic_response(&json!({})).is_err());
    }

    #[test]
    fn parses_openai_choice() {
        let v = json!({ "choices": [{ "message": { "role": "assistant", "content": "Hi" } }] });
        assert_eq!(parse_openai_response(&v).unwrap(), "Hi");
        assert!(parse_openai_response(&json!({ "choices": [] })).is_err());
    }

    #[test]
    fn provider_parses_from_config_text() {
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!("claude".parse::<LlmProvider>().unwrap(), LlmProvider::Anthropic);
        assert!("gemini".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let cfg = LlmClientConfig::openai("sk-secret", "m");
        assert!(!format!("{cfg:?}").contains("sk-secret"));
    }
}
