//! Camera overlay requests. Nova has no camera access, so it explains what
//! it needs instead.

use async_trait::async_trait;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, ConsentKind, Skill, SkillContext};
use crate::text::contains_any;

const TRIGGERS: &[&str] = &["ar overlay", "recognize", "what is this object"];

pub struct ArOverlay;

impl ArOverlay {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self)
    }
}

#[async_trait]
impl Skill for ArOverlay {
    fn name(&self) -> &'static str {
        "ar_overlay"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    fn required_consent(&self) -> Option<ConsentKind> {
        Some(ConsentKind::Recording)
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let reply = if contains_any(text, &["what is this object", "recognize"]) {
            "👓 I can't see through a camera from the terminal. Describe the object (shape, \
             colour, markings, where you found it) and I'll help identify it."
        } else {
            "👓 AR Overlay\n\n\
             Overlays need a camera feed, which this Nova build does not capture. \
             You can still ask me to explain labels, translate signs you type in, or \
             identify objects from a description."
        };
        Ok(Some(reply.to_string()))
    }
}
