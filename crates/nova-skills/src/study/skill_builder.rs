//! Learning paths and an XP tracker persisted as a preference.

use std::collections::BTreeMap;

use async_trait::async_trait;
use nova_store::MemoryStore;
use regex::Regex;
use tracing::info;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext};
use crate::text::{contains_any, title_case, topic_after};

const TRIGGERS: &[&str] = &["learning path", "skill tracker", "progress"];

/// Preference key holding `{skill: xp}`.
pub const SKILL_XP_KEY: &str = "skill_xp";

const XP_PER_LEVEL: u32 = 100;

pub type XpTable = BTreeMap<String, u32>;

/// Level reached with `xp` points, starting at 1.
pub fn level_for(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

pub struct SkillBuilder {
    memory: MemoryStore,
    log_re: Regex,
}

impl SkillBuilder {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            memory: ctx.memory.clone(),
            log_re: Regex::new(r"(?i)\blog\s+progress\s+(?:on\s+|in\s+)?(.+?)\s+(\d{1,5})\s*(?:xp)?\s*$")?,
        })
    }

    async fn table(&self) -> SkillResult<XpTable> {
        Ok(self.memory.get_preference(SKILL_XP_KEY, XpTable::new()).await?)
    }

    async fn log(&self, skill: &str, xp: u32) -> SkillResult<String> {
        let skill = skill.trim().to_lowercase();
        let mut table = self.table().await?;
        let before = table.get(&skill).copied().unwrap_or(0);
        let after = before.saturating_add(xp);
        table.insert(skill.clone(), after);
        self.memory.learn_preference(SKILL_XP_KEY, &table).await?;
        info!(skill = %skill, xp, total = after, "logged skill progress");

        let mut out = format!("📈 +{xp} XP in {}. Total: {after} XP (level {}).", title_case(&skill), level_for(after));
        if level_for(after) > level_for(before) {
            out.push_str(" 🎉 Level up!");
        }
        Ok(out)
    }

    async fn tracker(&self) -> SkillResult<String> {
        let table = self.table().await?;
        if table.is_empty() {
            return Ok("📈 No progress logged yet. Try `log progress rust 30`.".into());
        }
        let mut out = String::from("📈 Skill Tracker\n");
        for (skill, xp) in &table {
            let into_level = xp % XP_PER_LEVEL;
            let filled = (into_level / 10) as usize;
            out.push_str(&format!(
                "\n{:<16} L{} [{}{}] {xp} XP",
                title_case(skill),
                level_for(*xp),
                "█".repeat(filled),
                "░".repeat(10 - filled)
            ));
        }
        Ok(out)
    }
}

fn learning_path(topic: &str) -> String {
    format!(
        "🛤️ Learning Path: {topic}\n\n\
         1. Foundations: core vocabulary and the mental model behind {topic}.\n\
         2. Guided practice: follow a tutorial end to end.\n\
         3. Build: a small project of your own using {topic}.\n\
         4. Deepen: read real-world code or papers and note what surprises you.\n\
         5. Teach: explain {topic} to someone else or write it up.\n\n\
         Log progress as you go with `log progress {} <xp>`.",
        topic.to_lowercase()
    )
}

#[async_trait]
impl Skill for SkillBuilder {
    fn name(&self) -> &'static str {
        "skill_builder"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        if let Some(caps) = self.log_re.captures(text.trim()) {
            let xp: u32 = caps[2].parse().unwrap_or(0);
            return self.log(&caps[1], xp).await.map(Some);
        }
        if contains_any(text, &["learning path"]) {
            let topic = topic_after(text, "learning path")
                .map(title_case)
                .unwrap_or_else(|| "Your Next Skill".into());
            return Ok(Some(learning_path(&topic)));
        }
        self.tracker().await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_every_hundred_xp() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(99), 1);
        assert_eq!(level_for(100), 2);
    }

    #[tokio::test]
    async fn progress_is_persisted() {
        let memory = MemoryStore::in_memory().await.unwrap();
        let ctx = SkillContext::new(memory.clone(), "s");
        let skill = SkillBuilder::new(&ctx).unwrap();
        let consent = ConsentFlags::default();

        skill.route("log progress rust 60", &consent).await.unwrap();
        let reply = skill.route("log progress rust 50 xp", &consent).await.unwrap().unwrap();
        assert!(reply.contains("Total: 110 XP (level 2)"));
        assert!(reply.contains("Level up"));

        let table: XpTable = memory.get_preference(SKILL_XP_KEY, XpTable::new()).await.unwrap();
        assert_eq!(table.get("rust"), Some(&110));

        let tracker = skill.route("show my progress", &consent).await.unwrap().unwrap();
        assert!(tracker.contains("Rust"));
    }
}
