//! Errand coordination: reminders and drafted calls, bookings and orders.
//!
//! Nothing is ever placed or sent. Drafts and reminders live only for the
//! lifetime of the process.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, ConsentKind, Skill, SkillContext, lock_state};
use crate::text::{after, find_ci};

const TRIGGERS: &[&str] = &["call", "book", "order", "message", "remind"];

/// Verbs that produce a draft, in match priority.
const DRAFT_VERBS: &[&str] = &["call", "book", "order", "message"];

#[derive(Debug, Default)]
struct Agenda {
    reminders: Vec<String>,
    drafts: Vec<String>,
}

pub struct Coordinator {
    agenda: Mutex<Agenda>,
}

impl Coordinator {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            agenda: Mutex::new(Agenda::default()),
        })
    }

    fn list(&self) -> SkillResult<String> {
        let agenda = lock_state(&self.agenda)?;
        if agenda.reminders.is_empty() && agenda.drafts.is_empty() {
            return Ok("📋 No reminders or drafts yet. Try `remind me to call mom`.".into());
        }
        let mut out = String::from("📋 Your list\n");
        for (i, r) in agenda.reminders.iter().enumerate() {
            out.push_str(&format!("\n⏰ {}. {r}", i + 1));
        }
        for (i, d) in agenda.drafts.iter().enumerate() {
            out.push_str(&format!("\n📝 {}. {d}", i + 1));
        }
        Ok(out)
    }
}

#[async_trait]
impl Skill for Coordinator {
    fn name(&self) -> &'static str {
        "coordinator"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    fn required_consent(&self) -> Option<ConsentKind> {
        Some(ConsentKind::Payments)
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let lowered = text.to_ascii_lowercase();
        if lowered.contains("reminders") || lowered.contains("my list") {
            return self.list().map(Some);
        }

        if find_ci(text, "remind").is_some() {
            let Some(task) = after(text, "remind me to").or_else(|| after(text, "remind me"))
            else {
                return Ok(Some("⏰ What should I remind you about? Try `remind me to ...`.".into()));
            };
            let count = {
                let mut agenda = lock_state(&self.agenda)?;
                agenda.reminders.push(task.to_string());
                agenda.reminders.len()
            };
            return Ok(Some(format!(
                "⏰ Reminder #{count} saved: {task}\nSay `reminders` to see your list."
            )));
        }

        let Some(verb) = DRAFT_VERBS.iter().find(|v| lowered.contains(*v)) else {
            return Ok(None);
        };
        let what = after(text, verb).unwrap_or("(details needed)");
        let draft = format!("{verb} {what}");
        lock_state(&self.agenda)?.drafts.push(draft.clone());
        Ok(Some(format!(
            "📝 Drafted: {draft}\n\nI've prepared this but won't place, pay or send anything. \
             Review the details and confirm it yourself."
        )))
    }
}
