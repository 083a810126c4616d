//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization, config loading and output formatting.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use nova_core::NovaConfig;
use nova_llm::ProviderKeys;
use nova_store::{ConversationTurn, DerivedStats, MemoryStore, Preference};
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Load the config file, apply a session override and log any warnings.
pub fn load_config(path: &str, session: Option<String>) -> Result<NovaConfig> {
    let mut config =
        NovaConfig::load(path).with_context(|| format!("failed to load config from {path}"))?;
    if session.is_some() {
        config.assistant.session_id = session;
    }
    for warning in config.validate(&ProviderKeys::from_env()) {
        warn!("{warning}");
    }
    Ok(config)
}

/// Open the configured store without building the whole assistant.
pub async fn open_store(config: &NovaConfig) -> Result<MemoryStore> {
    let path = config.assistant.database_path.clone();
    MemoryStore::open(&path)
        .await
        .with_context(|| format!("failed to open memory store at {}", path.display()))
}

/// The session to inspect: the configured one, else the most recently
/// active one in the store.
pub async fn resolve_session(config: &NovaConfig, store: &MemoryStore) -> Result<Option<String>> {
    if let Some(id) = &config.assistant.session_id {
        return Ok(Some(id.clone()));
    }
    let sessions = store.sessions().await.context("failed to list sessions")?;
    Ok(sessions.into_iter().next().map(|s| s.session_id))
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

pub fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// One history line, content cut to `width` characters.
pub fn format_turn(turn: &ConversationTurn, width: usize) -> String {
    let mut content: String = turn.content.replace('\n', " ");
    if content.chars().count() > width {
        content = content.chars().take(width.saturating_sub(3)).collect();
        content.push_str("...");
    }
    let route = turn
        .metadata
        .get("route")
        .and_then(|v| v.as_str())
        .map(|r| format!(" [{r}]"))
        .unwrap_or_default();
    format!(
        "  {}  {:<9}{}  {}",
        local_time(turn.timestamp),
        turn.role.as_str(),
        route,
        content
    )
}

pub fn format_preference(pref: &Preference) -> String {
    format!(
        "  {:<24} {:<30} confidence {:.2}  ({})",
        pref.key,
        pref.value.to_string(),
        pref.confidence,
        local_time(pref.learned_at)
    )
}

/// Human-readable rendering of derived usage statistics.
pub fn format_patterns(stats: &DerivedStats) -> String {
    if stats.is_insufficient() {
        return "  Not enough conversation history to analyze yet.".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("  Interactions: {}\n", stats.total_interactions));
    out.push_str(&format!(
        "  Engagement: {}\n",
        stats.engagement_level.as_str()
    ));
    if let Some(hour) = stats.most_active_hour {
        out.push_str(&format!("  Most active hour: {hour:02}:00\n"));
    }
    if !stats.top_request_words.is_empty() {
        let words: Vec<String> = stats
            .top_request_words
            .iter()
            .map(|w| format!("{} ({})", w.word, w.count))
            .collect();
        out.push_str(&format!("  Top words: {}\n", words.join(", ")));
    }
    for (domain, level) in &stats.expertise_estimate {
        out.push_str(&format!(
            "  Expertise {}: {}\n",
            snake(domain),
            snake(level)
        ));
    }
    out.trim_end().to_string()
}

/// A preference value typed on the command line.
pub fn parse_pref_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn snake<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::from("?"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::{TurnMetadata, TurnRole};

    #[test]
    fn pref_values_prefer_json() {
        assert_eq!(parse_pref_value("42"), serde_json::json!(42));
        assert_eq!(parse_pref_value("[1,2]"), serde_json::json!([1, 2]));
        assert_eq!(parse_pref_value("calm"), serde_json::json!("calm"));
    }

    #[test]
    fn long_turns_are_truncated() {
        let mut metadata = TurnMetadata::new();
        metadata.insert("route".into(), "skill".into());
        let turn = ConversationTurn {
            id: 1,
            session_id: "s".into(),
            role: TurnRole::Assistant,
            content: "x".repeat(100),
            timestamp: Utc::now(),
            metadata,
        };
        let line = format_turn(&turn, 20);
        assert!(line.contains("[skill]"));
        assert!(line.ends_with(&format!("{}...", "x".repeat(17))));
    }

    #[test]
    fn empty_stats_say_so() {
        let stats = nova_store::analytics::analyze(&[]);
        assert!(format_patterns(&stats).contains("Not enough"));
    }
}
