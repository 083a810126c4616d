//! Time-of-day and habit aware focus guidance.

use async_trait::async_trait;
use chrono::{Local, Timelike};
use nova_store::MemoryStore;
use tracing::warn;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext};

const TRIGGERS: &[&str] = &[
    "focus",
    "productive",
    "productivity",
    "what should i work on",
    "context",
];

pub struct HyperContext {
    memory: MemoryStore,
    session_id: String,
}

impl HyperContext {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            memory: ctx.memory.clone(),
            session_id: ctx.session_id.clone(),
        })
    }
}

/// Guidance for the given local hour.
pub fn time_of_day_tip(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Morning focus: tackle your hardest task first while energy is high.",
        12..=13 => "Midday: batch quick replies and admin, then take a short walk.",
        14..=17 => "Afternoon: good time for collaborative work and reviews.",
        18..=21 => "Evening: review what you finished today and plan tomorrow's top three.",
        _ => "It's late. Wrap up, write down open loops, and get some rest.",
    }
}

#[async_trait]
impl Skill for HyperContext {
    fn name(&self) -> &'static str {
        "hyper_context"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, _text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let hour = Local::now().hour();
        let mut out = format!("🧠 Context Check\n\n{}", time_of_day_tip(hour));

        match self.memory.analyze_patterns(&self.session_id).await {
            Ok(stats) if !stats.top_request_words.is_empty() => {
                let themes: Vec<&str> = stats
                    .top_request_words
                    .iter()
                    .take(3)
                    .map(|w| w.word.as_str())
                    .collect();
                out.push_str(&format!(
                    "\n\nYou've been focused on: {}. Keep going with the one that matters most today.",
                    themes.join(", ")
                ));
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "pattern lookup failed"),
        }
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tips_cover_the_day() {
        assert!(time_of_day_tip(8).starts_with("Morning"));
        assert!(time_of_day_tip(15).starts_with("Afternoon"));
        assert!(time_of_day_tip(2).starts_with("It's late"));
    }
}
