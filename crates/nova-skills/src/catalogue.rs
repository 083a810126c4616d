//! The built-in skill catalogue, in registration order.

use std::sync::Arc;

use crate::advanced::{
    ar_overlay::ArOverlay, coordinator::Coordinator, doppelganger::Doppelganger,
    negotiator::Negotiator, voice_style::VoiceStyle,
};
use crate::device::{
    cross_device::CrossDevice, emotion::EmotionWatcher, hyper_context::HyperContext,
    pc_control::PcControl, predictor::Predictor,
};
use crate::error::SkillResult;
use crate::security::{dark_web::DarkWebWatch, threat::ThreatMode};
use crate::skill::{Skill, SkillCategory, SkillContext, SkillFactory};
use crate::study::{
    autopilot::LifeAutopilot, collab::CollabStudy, companion::StudyCompanion,
    deep_research::DeepResearch, exam_prep::ExamPrep, knowledge_graph::KnowledgeGraph,
    language_guardian::LanguageGuardian, lecture::Lecture, skill_builder::SkillBuilder,
};

fn entry<S, F>(name: &'static str, category: SkillCategory, ctor: F) -> SkillFactory
where
    S: Skill + 'static,
    F: Fn(&SkillContext) -> SkillResult<S> + Send + 'static,
{
    SkillFactory::new(name, category, move |ctx| {
        Ok(Arc::new(ctor(ctx)?) as Arc<dyn Skill>)
    })
}

/// Names of every built-in skill, in catalogue order.
pub const BUILTIN_SKILLS: [&str; 21] = [
    "hyper_context",
    "pc_control",
    "cross_device",
    "predictor",
    "emotion",
    "dark_web_watch",
    "threat_mode",
    "negotiator",
    "ar_overlay",
    "voice_style",
    "doppelganger",
    "coordinator",
    "study_companion",
    "lecture",
    "knowledge_graph",
    "exam_prep",
    "skill_builder",
    "collab_study",
    "language_guardian",
    "deep_research",
    "life_autopilot",
];

/// Factories for all built-in skills.
pub fn builtin_catalogue() -> Vec<SkillFactory> {
    use SkillCategory::{Advanced, Device, Security, Study};

    vec![
        entry("hyper_context", Device, HyperContext::new),
        entry("pc_control", Device, PcControl::new),
        entry("cross_device", Device, CrossDevice::new),
        entry("predictor", Device, Predictor::new),
        entry("emotion", Device, EmotionWatcher::new),
        entry("dark_web_watch", Security, DarkWebWatch::new),
        entry("threat_mode", Security, ThreatMode::new),
        entry("negotiator", Advanced, Negotiator::new),
        entry("ar_overlay", Advanced, ArOverlay::new),
        entry("voice_style", Advanced, VoiceStyle::new),
        entry("doppelganger", Advanced, Doppelganger::new),
        entry("coordinator", Advanced, Coordinator::new),
        entry("study_companion", Study, StudyCompanion::new),
        entry("lecture", Study, Lecture::new),
        entry("knowledge_graph", Study, KnowledgeGraph::new),
        entry("exam_prep", Study, ExamPrep::new),
        entry("skill_builder", Study, SkillBuilder::new),
        entry("collab_study", Study, CollabStudy::new),
        entry("language_guardian", Study, LanguageGuardian::new),
        entry("deep_research", Study, DeepResearch::new),
        entry("life_autopilot", Study, LifeAutopilot::new),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::MemoryStore;

    #[test]
    fn catalogue_matches_names_and_is_category_ordered() {
        let catalogue = builtin_catalogue();
        let names: Vec<&str> = catalogue.iter().map(|f| f.name).collect();
        assert_eq!(names, BUILTIN_SKILLS);
        assert!(catalogue.windows(2).all(|w| w[0].category <= w[1].category));
    }

    #[tokio::test]
    async fn every_skill_reports_its_catalogue_name() {
        let ctx = SkillContext::new(MemoryStore::in_memory().await.unwrap(), "s");
        for factory in builtin_catalogue() {
            let expected = factory.name;
            // pc_control needs a supported host platform.
            if let Ok(skill) = factory.build(&ctx) {
                assert_eq!(skill.name(), expected);
                assert!(!skill.triggers().is_empty());
            }
        }
    }
}
