//! Group study planning.

use async_trait::async_trait;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext};
use crate::text::{contains_any, title_case, topic_after};

const TRIGGERS: &[&str] = &["study group", "collaborate", "group study", "study agenda"];

pub struct CollabStudy;

impl CollabStudy {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self)
    }
}

fn topic_of(text: &str) -> Option<String> {
    TRIGGERS.iter().find_map(|kw| topic_after(text, kw)).map(title_case)
}

#[async_trait]
impl Skill for CollabStudy {
    fn name(&self) -> &'static str {
        "collab_study"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let topic = topic_of(text).unwrap_or_else(|| "Your Topic".into());
        if contains_any(text, &["agenda"]) {
            return Ok(Some(format!(
                "🗓️ Study Agenda: {topic} (60 min)\n\n\
                 00-10  Check-in and goals\n\
                 10-30  Each member explains one subtopic\n\
                 30-45  Work practice problems in pairs\n\
                 45-55  Quiz each other\n\
                 55-60  Assign follow-ups for next session"
            )));
        }
        Ok(Some(format!(
            "👥 Group Study: {topic}\n\n\
             • Keep the group to 3-5 people with a shared goal.\n\
             • Rotate a facilitator and a note-taker each session.\n\
             • Split the material so everyone teaches a part.\n\
             • Share one document for notes and open questions.\n\n\
             Say `study agenda {}` for a session plan.",
            topic.to_lowercase()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::MemoryStore;

    #[tokio::test]
    async fn agenda_names_topic() {
        let ctx = SkillContext::new(MemoryStore::in_memory().await.unwrap(), "s");
        let reply = CollabStudy::new(&ctx)
            .unwrap()
            .route("study agenda for organic chemistry", &ConsentFlags::default())
            .await
            .unwrap()
            .unwrap();
        assert!(reply.starts_with("🗓️ Study Agenda: Organic Chemistry"));
    }
}
