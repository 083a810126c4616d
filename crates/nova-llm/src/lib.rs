//! # nova-llm
//!
//! The knowledge backend behind Nova's fallback path.
//!
//! - [`client`]: non-streaming Anthropic / OpenAI chat client.
//! - [`backend`]: the [`KnowledgeBackend`] trait, provider selection and the
//!   timeout-bounded [`LlmBackend`].
//! - [`flashcards`]: structured flashcard generation.

pub mod backend;
pub mod client;
pub mod error;
pub mod flashcards;
pub mod types;

pub use backend::{
    BackendSettings, KnowledgeBackend, LlmBackend, ProviderKeys, persona_preamble, select_provider,
    with_timeout,
};
pub use client::{LlmClient, LlmClientConfig, LlmProvider};
pub use error::{LlmError, LlmResult};
pub use flashcards::{Flashcard, generate_flashcards, parse_flashcards};
pub use types::{ChatRequest, Message, Role};
