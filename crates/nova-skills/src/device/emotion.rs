//! Mood check-ins with a small lexicon classifier.

use async_trait::async_trait;
use chrono::Utc;
use nova_store::MemoryStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext};

const TRIGGERS: &[&str] = &[
    "i feel",
    "i'm feeling",
    "feeling",
    "mood",
    "stressed",
    "anxious",
];

/// Preference key holding the latest [`MoodEntry`].
pub const LAST_MOOD_KEY: &str = "last_mood";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Stressed,
    Sad,
    Happy,
    Tired,
    Neutral,
}

const LEXICON: &[(Mood, &[&str])] = &[
    (Mood::Stressed, &["stress", "anxious", "overwhelm", "worried", "panic", "deadline"]),
    (Mood::Sad, &["sad", "down", "lonely", "upset", "depressed"]),
    (Mood::Tired, &["tired", "exhausted", "sleepy", "burned out", "burnt out"]),
    (Mood::Happy, &["happy", "great", "excited", "good", "awesome", "proud"]),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood: Mood,
    pub at: chrono::DateTime<Utc>,
}

/// First lexicon mood whose cue appears in `text`.
pub fn classify(text: &str) -> Mood {
    let lowered = text.to_lowercase();
    LEXICON
        .iter()
        .find(|(_, cues)| cues.iter().any(|c| lowered.contains(c)))
        .map(|(mood, _)| *mood)
        .unwrap_or(Mood::Neutral)
}

pub struct EmotionWatcher {
    memory: MemoryStore,
}

impl EmotionWatcher {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            memory: ctx.memory.clone(),
        })
    }
}

#[async_trait]
impl Skill for EmotionWatcher {
    fn name(&self) -> &'static str {
        "emotion"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let mood = classify(text);
        let entry = MoodEntry { mood, at: Utc::now() };
        if let Err(e) = self.memory.learn_preference(LAST_MOOD_KEY, &entry).await {
            warn!(error = %e, "could not store mood");
        }

        let reply = match mood {
            Mood::Stressed => {
                "💙 That sounds stressful. Try a 4-7-8 breath, then pick the single next step \
                 and ignore the rest for 25 minutes."
            }
            Mood::Sad => {
                "💙 I'm sorry you're feeling down. A short walk or a message to a friend can \
                 help. I'm here if you want to talk it through."
            }
            Mood::Tired => {
                "😴 You sound worn out. A 20-minute rest or an early night will do more than \
                 pushing through."
            }
            Mood::Happy => "😊 Love to hear it! Want to use the momentum on something on your list?",
            Mood::Neutral => "🙂 Thanks for checking in. How can I help you right now?",
        };
        Ok(Some(reply.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_first_matching_lexicon() {
        assert_eq!(classify("I feel so stressed about the deadline"), Mood::Stressed);
        assert_eq!(classify("feeling great today"), Mood::Happy);
        assert_eq!(classify("I'm feeling okay"), Mood::Neutral);
    }

    #[tokio::test]
    async fn mood_is_remembered() {
        let memory = MemoryStore::in_memory().await.unwrap();
        let skill = EmotionWatcher::new(&SkillContext::new(memory.clone(), "s")).unwrap();
        skill
            .route("I feel exhausted", &ConsentFlags::default())
            .await
            .unwrap();

        let pref = memory.preference(LAST_MOOD_KEY).await.unwrap().unwrap();
        assert_eq!(pref.value["mood"], "tired");
    }
}
