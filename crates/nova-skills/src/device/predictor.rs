//! Suggestions derived from the user's own usage patterns.

use async_trait::async_trait;
use nova_store::{DerivedStats, EngagementLevel, MemoryStore};

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext};
use crate::text::contains_any;

const TRIGGERS: &[&str] = &["predict", "suggest", "recommend"];

/// Requests about grades belong to the exam skills, not usage habits.
const DECLINE_WHEN: &[&str] = &["score", "exam"];

pub struct Predictor {
    memory: MemoryStore,
    session_id: String,
}

impl Predictor {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            memory: ctx.memory.clone(),
            session_id: ctx.session_id.clone(),
        })
    }
}

/// Build a suggestion from usage statistics.
pub fn suggestion(stats: &DerivedStats) -> String {
    if stats.is_insufficient() {
        return "I don't know your habits yet. Chat with me a little more and I'll start \
                spotting patterns."
            .to_string();
    }

    let mut parts = Vec::new();
    if let Some(topic) = stats.top_request_words.first() {
        parts.push(format!(
            "you ask about \"{}\" often, so a focused session on it would pay off",
            topic.word
        ));
    }
    if let Some(hour) = stats.most_active_hour {
        parts.push(format!(
            "you're most active around {hour:02}:00, a good slot for deep work"
        ));
    }
    if stats.engagement_level == EngagementLevel::High {
        parts.push("you've been busy; schedule a break".to_string());
    }

    if parts.is_empty() {
        "Keep going; I'll have better suggestions once I've seen a few more requests.".to_string()
    } else {
        parts.join("; ")
    }
}

#[async_trait]
impl Skill for Predictor {
    fn name(&self) -> &'static str {
        "predictor"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        if contains_any(text, DECLINE_WHEN) {
            return Ok(None);
        }
        let stats = self.memory.analyze_patterns(&self.session_id).await?;
        if stats.is_insufficient() {
            return Ok(None);
        }
        Ok(Some(format!("Prediction: {}", suggestion(&stats))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::{TurnMetadata, TurnRole, analytics};

    #[test]
    fn empty_history_asks_for_more() {
        let text = suggestion(&analytics::analyze(&[]));
        assert!(text.contains("don't know your habits"));
    }

    #[tokio::test]
    async fn declines_without_history_or_for_exam_questions() {
        let memory = MemoryStore::in_memory().await.unwrap();
        let skill = Predictor::new(&SkillContext::new(memory.clone(), "s")).unwrap();
        let consent = ConsentFlags::default();

        assert_eq!(skill.route("suggest something", &consent).await.unwrap(), None);

        memory
            .record_turn("s", TurnRole::User, "practise guitar chords", TurnMetadata::new())
            .await
            .unwrap();
        let reply = skill.route("suggest something", &consent).await.unwrap().unwrap();
        assert!(reply.starts_with("Prediction:"));
        assert!(reply.contains("practise"));

        assert_eq!(skill.route("predict score python", &consent).await.unwrap(), None);
    }
}
