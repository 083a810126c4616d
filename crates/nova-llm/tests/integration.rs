//! Integration tests for nova-llm that need no network.

use std::sync::Arc;

use async_trait::async_trait;
use nova_llm::{
    BackendSettings, KnowledgeBackend, LlmBackend, LlmError, LlmProvider, LlmResult, ProviderKeys,
    generate_flashcards,
};

struct Echo;

#[async_trait]
impl KnowledgeBackend for Echo {
    async fn get_answer(&self, query: &str) -> LlmResult<String> {
        Ok(format!("echo: {query}"))
    }

    async fn complete_raw(&self, _prompt: &str) -> LlmResult<String> {
        Ok("```json\n[{\"question\": \"What is a neuron?\", \"answer\": \"A unit.\"}]\n```".into())
    }

    fn describe(&self) -> String {
        "echo".into()
    }
}

#[tokio::test]
async fn flashcards_use_raw_completion() {
    let backend: Arc<dyn KnowledgeBackend> = Arc::new(Echo);
    let cards = generate_flashcards(backend.as_ref(), "machine learning", 5).await;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].question, "What is a neuron?");
}

#[test]
fn openai_gateway_is_used_when_configured() {
    let settings = BackendSettings {
        openai_base_url: Some("https://openrouter.ai/api/v1".into()),
        ..BackendSettings::default()
    };
    let keys = ProviderKeys {
        openai: Some("sk-test".into()),
        anthropic: None,
    };
    let backend = LlmBackend::from_settings(&settings, &keys).unwrap().unwrap();
    assert!(backend.describe().starts_with("openai"));
}

#[test]
fn default_provider_is_openai() {
    assert_eq!(BackendSettings::default().default_provider, LlmProvider::OpenAI);
}

#[test]
fn timeout_error_reports_seconds() {
    let err = LlmError::Timeout { seconds: 30 };
    assert_eq!(err.to_string(), "llm call timed out after 30s");
}
