//! Integration tests for the built-in skills against a real memory store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nova_skills::device::emotion::LAST_MOOD_KEY;
use nova_skills::study::skill_builder::{SKILL_XP_KEY, XpTable};
use nova_skills::{
    AppSpec, ConsentFlags, ConsentKind, Launcher, Platform, SkillContext, SkillError,
    SkillResult, builtin_catalogue,
};
use nova_store::MemoryStore;
use url::Url;

/// Records launcher calls instead of spawning processes.
#[derive(Default)]
struct RecordingLauncher {
    calls: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl Launcher for RecordingLauncher {
    async fn open_url(&self, url: &Url) -> SkillResult<()> {
        self.calls.lock().unwrap().push(format!("open {url}"));
        if self.fail {
            return Err(SkillError::ActionFailed {
                action: "open url".into(),
                reason: "no browser".into(),
            });
        }
        Ok(())
    }

    async fn launch_app(&self, app: &AppSpec) -> SkillResult<()> {
        self.calls.lock().unwrap().push(format!("launch {}", app.program));
        Ok(())
    }

    async fn close_app(&self, app: &AppSpec) -> SkillResult<()> {
        self.calls.lock().unwrap().push(format!("close {}", app.program));
        Ok(())
    }

    fn platform(&self) -> Platform {
        Platform::Linux
    }
}

async fn context(launcher: Arc<RecordingLauncher>) -> (SkillContext, MemoryStore) {
    let memory = MemoryStore::in_memory().await.unwrap();
    let ctx = SkillContext::new(memory.clone(), "test-session").with_launcher(launcher);
    (ctx, memory)
}

fn build(name: &str, ctx: &SkillContext) -> Arc<dyn nova_skills::Skill> {
    builtin_catalogue()
        .into_iter()
        .find(|f| f.name == name)
        .unwrap()
        .build(ctx)
        .unwrap()
}

#[tokio::test]
async fn pc_control_opens_urls_and_apps_through_launcher() {
    let launcher = Arc::new(RecordingLauncher::default());
    let (ctx, _) = context(launcher.clone()).await;
    let skill = build("pc_control", &ctx);
    let consent = ConsentFlags::default().with(ConsentKind::DeviceActions);

    let reply = skill.route("open youtube", &consent).await.unwrap();
    assert_eq!(
        reply.as_deref(),
        Some("🌐 Opened https://www.youtube.com/ in your default browser.")
    );

    let reply = skill.route("please launch the calculator", &consent).await.unwrap();
    assert_eq!(reply.as_deref(), Some("🚀 Launched Calculator."));

    let reply = skill.route("close calculator", &consent).await.unwrap();
    assert_eq!(reply.as_deref(), Some("🛑 Closed Calculator."));

    assert_eq!(
        *launcher.calls.lock().unwrap(),
        vec![
            "open https://www.youtube.com/".to_string(),
            "launch gnome-calculator".to_string(),
            "close gnome-calculator".to_string(),
        ]
    );
}

#[tokio::test]
async fn pc_control_declines_unknown_targets_and_reports_failures() {
    let launcher = Arc::new(RecordingLauncher {
        fail: true,
        ..Default::default()
    });
    let (ctx, _) = context(launcher).await;
    let skill = build("pc_control", &ctx);
    let consent = ConsentFlags::all();

    assert!(skill.route("start a business", &consent).await.unwrap().is_none());

    let reply = skill.route("open github", &consent).await.unwrap().unwrap();
    assert!(reply.starts_with("⚠️"));
}

#[tokio::test]
async fn consent_gated_skills_name_their_consent() {
    let (ctx, _) = context(Arc::new(RecordingLauncher::default())).await;
    for (name, key) in [
        ("pc_control", "device_actions"),
        ("negotiator", "payments"),
        ("lecture", "recording"),
        ("voice_style", "style_adapt"),
    ] {
        let skill = build(name, &ctx);
        assert!(skill.required_consent().is_some(), "{name} should need consent");
        assert!(skill.consent_refusal().contains(key), "{name} refusal");
    }
    assert!(build("study_companion", &ctx).required_consent().is_none());
}

#[tokio::test]
async fn skills_write_preferences_not_turns() {
    let (ctx, memory) = context(Arc::new(RecordingLauncher::default())).await;
    let consent = ConsentFlags::all();

    build("emotion", &ctx)
        .route("I feel stressed about exams", &consent)
        .await
        .unwrap();
    build("skill_builder", &ctx)
        .route("log progress python 40", &consent)
        .await
        .unwrap();

    assert!(memory.preference(LAST_MOOD_KEY).await.unwrap().is_some());
    let xp: XpTable = memory.get_preference(SKILL_XP_KEY, XpTable::new()).await.unwrap();
    assert_eq!(xp.get("python"), Some(&40));
    assert_eq!(memory.count_turns("test-session").await.unwrap(), 0);
}

#[tokio::test]
async fn xp_survives_a_rebuilt_skill() {
    let (ctx, _) = context(Arc::new(RecordingLauncher::default())).await;
    let consent = ConsentFlags::default();

    build("skill_builder", &ctx)
        .route("log progress rust 80", &consent)
        .await
        .unwrap();
    let reply = build("skill_builder", &ctx)
        .route("log progress rust 30", &consent)
        .await
        .unwrap()
        .unwrap();
    assert!(reply.contains("Total: 110 XP"));
}
