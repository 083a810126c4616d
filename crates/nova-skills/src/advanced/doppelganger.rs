//! A "digital twin" that can summarise the user and draft on their behalf.

use std::sync::Mutex;

use async_trait::async_trait;
use nova_store::MemoryStore;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext, lock_state};
use crate::text::{after, contains_any};

const TRIGGERS: &[&str] = &["digital twin", "doppelganger", "auto-reply", "attend meeting"];

pub struct Doppelganger {
    memory: MemoryStore,
    session_id: String,
    auto_reply: Mutex<bool>,
}

impl Doppelganger {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            memory: ctx.memory.clone(),
            session_id: ctx.session_id.clone(),
            auto_reply: Mutex::new(false),
        })
    }

    fn toggle_auto_reply(&self, text: &str) -> SkillResult<String> {
        let mut enabled = lock_state(&self.auto_reply)?;
        if contains_any(text, &[" off", "disable", "stop"]) {
            *enabled = false;
        } else if contains_any(text, &[" on", "enable", "start"]) {
            *enabled = true;
        }
        Ok(if *enabled {
            "🤖 Auto-reply is ON. I'll draft replies in your style for you to approve; \
             nothing is sent without you."
                .to_string()
        } else {
            "🤖 Auto-reply is OFF. Say `auto-reply on` to let me draft replies.".to_string()
        })
    }
}

#[async_trait]
impl Skill for Doppelganger {
    fn name(&self) -> &'static str {
        "doppelganger"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        if contains_any(text, &["auto-reply"]) {
            return self.toggle_auto_reply(text).map(Some);
        }

        if contains_any(text, &["attend meeting"]) {
            let topic = after(text, "attend meeting").unwrap_or("your meeting");
            return Ok(Some(format!(
                "📅 Meeting brief for {topic}\n\n\
                 I can't join calls, but here's a stand-in plan:\n\
                 1. Send your agenda points and questions ahead of time.\n\
                 2. Ask a colleague to share notes or a recording.\n\
                 3. Paste the notes here afterwards and I'll summarise the decisions."
            )));
        }

        let summary = self.memory.summarize(&self.session_id, 24).await?;
        let auto = *lock_state(&self.auto_reply)?;
        Ok(Some(format!(
            "👥 Your Digital Twin\n\n{summary}\n\nAuto-reply: {}",
            if auto { "on" } else { "off" }
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn auto_reply_toggles() {
        let ctx = SkillContext::new(MemoryStore::in_memory().await.unwrap(), "s");
        let skill = Doppelganger::new(&ctx).unwrap();
        let consent = ConsentFlags::default();

        let on = skill.route("auto-reply on", &consent).await.unwrap().unwrap();
        assert!(on.contains("ON"));
        let off = skill.route("auto-reply off", &consent).await.unwrap().unwrap();
        assert!(off.contains("OFF"));
    }

    #[tokio::test]
    async fn twin_summary_reads_memory() {
        let memory = MemoryStore::in_memory().await.unwrap();
        let ctx = SkillContext::new(memory, "s");
        let skill = Doppelganger::new(&ctx).unwrap();
        let reply = skill
            .route("show my digital twin", &ConsentFlags::default())
            .await
            .unwrap()
            .unwrap();
        assert!(reply.contains("No recent conversations."));
    }
}
