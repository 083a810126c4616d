//! Whisper-style translation of short phrases.
//!
//! Without a knowledge backend only a small built-in phrasebook is
//! available.

use std::sync::Arc;

use async_trait::async_trait;
use nova_llm::KnowledgeBackend;
use regex::Regex;
use tracing::warn;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, ConsentKind, Skill, SkillContext};

const TRIGGERS: &[&str] = &["translate live", "language guardian", "whisper translate"];

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("hi", "Hindi"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("ja", "Japanese"),
];

/// (english, language code, translation)
const PHRASEBOOK: &[(&str, &str, &str)] = &[
    ("hello", "hi", "नमस्ते"),
    ("hello", "es", "hola"),
    ("hello", "fr", "bonjour"),
    ("hello", "de", "hallo"),
    ("hello", "ja", "こんにちは"),
    ("thank you", "hi", "धन्यवाद"),
    ("thank you", "es", "gracias"),
    ("thank you", "fr", "merci"),
    ("thank you", "de", "danke"),
    ("thank you", "ja", "ありがとう"),
    ("goodbye", "hi", "अलविदा"),
    ("goodbye", "es", "adiós"),
    ("goodbye", "fr", "au revoir"),
    ("goodbye", "de", "auf Wiedersehen"),
    ("goodbye", "ja", "さようなら"),
];

fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

pub struct LanguageGuardian {
    backend: Option<Arc<dyn KnowledgeBackend>>,
    request_re: Regex,
}

impl LanguageGuardian {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            backend: ctx.backend.clone(),
            request_re: Regex::new(r"(?i)\b([a-z]{2})\s*(?:->|→|to)\s*([a-z]{2})\s*:\s*(.+)$")?,
        })
    }

    async fn translate(&self, from: &str, to: &str, phrase: &str) -> Option<String> {
        if let Some(backend) = &self.backend {
            let prompt = format!(
                "Translate from {} to {}. Reply with the translation only.\n\n{phrase}",
                language_name(from).unwrap_or(from),
                language_name(to).unwrap_or(to)
            );
            match backend.complete_raw(&prompt).await {
                Ok(reply) => return Some(reply.trim().to_string()),
                Err(e) => warn!(error = %e, "translation request failed"),
            }
        }
        if from != "en" {
            return None;
        }
        let key = phrase.trim().trim_end_matches(['.', '!', '?']).to_lowercase();
        PHRASEBOOK
            .iter()
            .find(|(en, code, _)| *en == key && *code == to)
            .map(|(_, _, t)| (*t).to_string())
    }
}

#[async_trait]
impl Skill for LanguageGuardian {
    fn name(&self) -> &'static str {
        "language_guardian"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    fn required_consent(&self) -> Option<ConsentKind> {
        Some(ConsentKind::Recording)
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let Some(caps) = self.request_re.captures(text) else {
            let codes: Vec<String> = LANGUAGES.iter().map(|(c, n)| format!("{c} ({n})")).collect();
            return Ok(Some(format!(
                "🌍 Language Guardian\n\nUse `translate live en->hi: your text`.\nLanguages: {}.",
                codes.join(", ")
            )));
        };
        let (from, to) = (caps[1].to_lowercase(), caps[2].to_lowercase());
        let phrase = caps[3].trim();

        Ok(Some(match self.translate(&from, &to, phrase).await {
            Some(translation) => format!("🌍 {from} → {to}: {translation}"),
            None => format!(
                "🌍 I can't translate \"{phrase}\" offline. Configure an API key for full translation."
            ),
        }))
    }
}
