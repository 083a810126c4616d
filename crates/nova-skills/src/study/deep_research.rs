//! Research outlines, optionally enriched by the knowledge backend.

use std::sync::Arc;

use async_trait::async_trait;
use nova_llm::KnowledgeBackend;
use tracing::warn;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext};
use crate::text::{contains_any, topic_after};

const TRIGGERS: &[&str] = &["deep research", "summarize papers", "cross-check sources"];

pub struct DeepResearch {
    backend: Option<Arc<dyn KnowledgeBackend>>,
}

impl DeepResearch {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            backend: ctx.backend.clone(),
        })
    }
}

fn outline(topic: &str) -> String {
    format!(
        "🔬 Research Outline: {topic}\n\n\
         1. Define the question: what exactly do you want to know about {topic}?\n\
         2. Survey: find two review articles and the most cited recent papers.\n\
         3. Compare: note where sources agree, disagree, and why.\n\
         4. Verify: check claims against primary data or official sources.\n\
         5. Synthesise: write a one-page summary with citations."
    )
}

const CROSS_CHECK: &str = "🧾 Source Cross-Check\n\n\
     • Who published it, and do they have a stake in the conclusion?\n\
     • Is there a primary source (dataset, paper, filing) behind the claim?\n\
     • Do at least two independent sources agree?\n\
     • Is it current? Check the date and any corrections.\n\
     • Do numbers add up when you recompute them?";

#[async_trait]
impl Skill for DeepResearch {
    fn name(&self) -> &'static str {
        "deep_research"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        if contains_any(text, &["cross-check sources"]) {
            return Ok(Some(CROSS_CHECK.to_string()));
        }

        let topic = topic_after(text, "deep research")
            .or_else(|| topic_after(text, "summarize papers"))
            .unwrap_or("your topic");
        let mut out = outline(topic);

        if let Some(backend) = &self.backend
            && topic != "your topic"
        {
            let prompt = format!(
                "Give a concise research briefing on {topic}: key findings, open questions, \
                 and three well-known sources to start from."
            );
            match backend.get_answer(&prompt).await {
                Ok(briefing) => {
                    out.push_str("\n\nBriefing:\n");
                    out.push_str(briefing.trim());
                }
                Err(e) => warn!(error = %e, topic, "research briefing failed"),
            }
        }
        Ok(Some(out))
    }
}
