//! Day planning with overlap detection.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveTime};
use regex::Regex;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, ConsentKind, Skill, SkillContext, lock_state};
use crate::text::contains_any;

const TRIGGERS: &[&str] = &["autopilot", "schedule my day", "routine", "automate", "add event"];

const DEFAULT_MINUTES: i64 = 60;

/// One block in the day plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub title: String,
    pub start: NaiveTime,
    pub minutes: i64,
}

impl Event {
    pub fn end(&self) -> NaiveTime {
        self.start + Duration::minutes(self.minutes)
    }

    pub fn overlaps(&self, other: &Event) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Events sorted by start time.
#[derive(Debug, Default)]
pub struct DayPlan {
    events: Vec<Event>,
}

impl DayPlan {
    /// Add `event`, returning the titles it conflicts with.
    pub fn add(&mut self, event: Event) -> Vec<String> {
        let conflicts = self
            .events
            .iter()
            .filter(|e| e.overlaps(&event))
            .map(|e| e.title.clone())
            .collect();
        let at = self.events.partition_point(|e| e.start <= event.start);
        self.events.insert(at, event);
        conflicts
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

pub struct LifeAutopilot {
    plan: Mutex<DayPlan>,
    event_re: Regex,
}

impl LifeAutopilot {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            plan: Mutex::new(DayPlan::default()),
            event_re: Regex::new(
                r"(?i)add\s+event\s+(.+?)\s+at\s+(\d{1,2}):(\d{2})(?:\s+for\s+(\d{1,3})(?:\s*(?:min|mins|minutes))?)?\s*$",
            )?,
        })
    }

    fn parse_event(&self, text: &str) -> Option<Event> {
        let caps = self.event_re.captures(text.trim())?;
        let start = NaiveTime::from_hms_opt(caps[2].parse().ok()?, caps[3].parse().ok()?, 0)?;
        let minutes = caps
            .get(4)
            .and_then(|m| m.as_str().parse().ok())
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_MINUTES);
        Some(Event {
            title: caps[1].trim().to_string(),
            start,
            minutes,
        })
    }

    fn render(plan: &DayPlan) -> String {
        if plan.events().is_empty() {
            return "🗓️ Your day is open. Add blocks with `add event <title> at HH:MM for <minutes>`."
                .into();
        }
        let mut out = String::from("🗓️ Today's Plan\n");
        for e in plan.events() {
            out.push_str(&format!(
                "\n{}-{}  {}",
                e.start.format("%H:%M"),
                e.end().format("%H:%M"),
                e.title
            ));
        }
        out
    }
}

#[async_trait]
impl Skill for LifeAutopilot {
    fn name(&self) -> &'static str {
        "life_autopilot"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    fn required_consent(&self) -> Option<ConsentKind> {
        Some(ConsentKind::DeviceActions)
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        if contains_any(text, &["add event"]) {
            let Some(event) = self.parse_event(text) else {
                return Ok(Some(
                    "🗓️ I couldn't read that. Use `add event <title> at HH:MM for <minutes>`.".into(),
                ));
            };
            let summary = format!(
                "{} at {} for {} min",
                event.title,
                event.start.format("%H:%M"),
                event.minutes
            );
            let conflicts = lock_state(&self.plan)?.add(event);
            return Ok(Some(if conflicts.is_empty() {
                format!("✅ Added {summary}.")
            } else {
                format!("⚠️ Added {summary}, but it overlaps with: {}.", conflicts.join(", "))
            }));
        }

        if contains_any(text, &["routine", "automate"]) {
            return Ok(Some(
                "🔁 Routine ideas\n\n\
                 • Morning: review today's plan, then one deep-work block.\n\
                 • Midday: inbox and messages in a single batch.\n\
                 • Evening: plan tomorrow and shut down notifications.\n\n\
                 Add each as an event to build your day."
                    .into(),
            ));
        }

        let plan = lock_state(&self.plan)?;
        Ok(Some(Self::render(&plan)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::MemoryStore;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn overlapping_events_are_reported() {
        let mut plan = DayPlan::default();
        assert!(plan.add(Event { title: "Gym".into(), start: t(7, 0), minutes: 60 }).is_empty());
        assert!(plan.add(Event { title: "Standup".into(), start: t(8, 0), minutes: 15 }).is_empty());
        let conflicts = plan.add(Event { title: "Call".into(), start: t(7, 30), minutes: 45 });
        assert_eq!(conflicts, vec!["Gym".to_string(), "Standup".to_string()]);
        assert_eq!(plan.events()[1].title, "Call");
    }

    #[tokio::test]
    async fn routes_add_and_show() {
        let ctx = SkillContext::new(MemoryStore::in_memory().await.unwrap(), "s");
        let skill = LifeAutopilot::new(&ctx).unwrap();
        let consent = ConsentFlags::all();

        let added = skill
            .route("add event Team sync at 09:30 for 30 min", &consent)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(added, "✅ Added Team sync at 09:30 for 30 min.");

        let plan = skill.route("schedule my day", &consent).await.unwrap().unwrap();
        assert!(plan.contains("09:30-10:00  Team sync"));
    }
}
