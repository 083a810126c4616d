//! Speaking-style preferences, with a guard against impersonating people.

use async_trait::async_trait;
use nova_store::MemoryStore;
use regex::Regex;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, ConsentKind, Skill, SkillContext};

const TRIGGERS: &[&str] = &["voice", "speak like", "tone", "style voice"];

/// Preference key for the chosen tone.
pub const VOICE_TONE_KEY: &str = "voice_tone";

const TONES: &[&str] = &[
    "formal",
    "casual",
    "friendly",
    "professional",
    "calm",
    "energetic",
    "narrator",
    "pirate",
];

pub struct VoiceStyle {
    memory: MemoryStore,
    block_impersonation: bool,
    imitate_re: Regex,
}

impl VoiceStyle {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            memory: ctx.memory.clone(),
            block_impersonation: ctx.settings.block_real_person_impersonation,
            imitate_re: Regex::new(
                r"(?i)\b(?:speak|sound|talk)\s+like\s+(?:a\s+|an\s+)?(.+)|\bimpersonate\s+(.+)|\bvoice\s+of\s+(.+)",
            )?,
        })
    }

    fn requested_style<'a>(&self, text: &'a str) -> Option<&'a str> {
        let caps = self.imitate_re.captures(text)?;
        (1..=3)
            .find_map(|i| caps.get(i))
            .map(|m| m.as_str().trim().trim_end_matches(['.', '!', '?']))
    }
}

fn tone_in(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    TONES.iter().copied().find(|t| lowered.contains(t))
}

#[async_trait]
impl Skill for VoiceStyle {
    fn name(&self) -> &'static str {
        "voice_style"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    fn required_consent(&self) -> Option<ConsentKind> {
        Some(ConsentKind::StyleAdapt)
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        if let Some(style) = self.requested_style(text)
            && tone_in(style).is_none()
            && self.block_impersonation
        {
            return Ok(Some(format!(
                "🙅 I can't imitate \"{style}\". Copying a real person's voice is blocked. \
                 Pick a tone instead: {}.",
                TONES.join(", ")
            )));
        }

        match tone_in(text) {
            Some(tone) => {
                self.memory.learn_preference(VOICE_TONE_KEY, tone).await?;
                Ok(Some(format!("🎙️ Got it. I'll use a {tone} tone from now on.")))
            }
            None => {
                let current: String = self
                    .memory
                    .get_preference(VOICE_TONE_KEY, "friendly".to_string())
                    .await?;
                Ok(Some(format!(
                    "🎙️ Current tone: {current}. Available tones: {}.\n\
                     Try `use a formal tone` or `speak like a narrator`.",
                    TONES.join(", ")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn skill(block: bool) -> (VoiceStyle, MemoryStore) {
        let memory = MemoryStore::in_memory().await.unwrap();
        let mut ctx = SkillContext::new(memory.clone(), "s");
        ctx.settings.block_real_person_impersonation = block;
        (VoiceStyle::new(&ctx).unwrap(), memory)
    }

    #[tokio::test]
    async fn real_people_are_refused() {
        let (skill, _) = skill(true).await;
        let reply = skill
            .route("speak like Morgan Freeman", &ConsentFlags::all())
            .await
            .unwrap()
            .unwrap();
        assert!(reply.contains("blocked"));
    }

    #[tokio::test]
    async fn tones_are_remembered() {
        let (skill, memory) = skill(true).await;
        skill
            .route("speak like a pirate", &ConsentFlags::all())
            .await
            .unwrap();
        let tone: String = memory
            .get_preference(VOICE_TONE_KEY, String::new())
            .await
            .unwrap();
        assert_eq!(tone, "pirate");
    }
}
