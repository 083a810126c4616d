//! Handoff and sync guidance across the user's devices.

use async_trait::async_trait;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, ConsentKind, Skill, SkillContext};
use crate::text::contains_any;

const TRIGGERS: &[&str] = &["device", "phone", "tablet"];

pub struct CrossDevice;

impl CrossDevice {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self)
    }
}

#[async_trait]
impl Skill for CrossDevice {
    fn name(&self) -> &'static str {
        "cross_device"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    fn required_consent(&self) -> Option<ConsentKind> {
        Some(ConsentKind::DeviceActions)
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let reply = if contains_any(text, &["sync", "transfer", "send to"]) {
            "📲 Sync: Nova keeps your conversation history in one local database. \
             To continue on another device, copy the database file or share the session id \
             with `nova chat --session <id>`."
        } else if contains_any(text, &["handoff", "continue on", "switch to"]) {
            "🔁 Handoff: start Nova on the other device with the same session id and your \
             recent context comes with you."
        } else {
            "📱 Cross-Device\n\n\
             - `sync my phone`: share history between devices\n\
             - `handoff to tablet`: continue a session elsewhere\n\n\
             Nova never controls a remote device without your explicit consent."
        };
        Ok(Some(reply.to_string()))
    }
}
