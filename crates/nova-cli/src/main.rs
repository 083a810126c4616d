//! Nova CLI entry point.
//!
//! Parses the command line, loads configuration and dispatches to the
//! subcommand handlers.

mod cli;
mod helpers;
mod repl;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use nova_core::{Assistant, NovaConfig};
use tracing::info;

use crate::cli::{Cli, Commands, PrefsAction};
use crate::helpers::{
    format_patterns, format_preference, format_turn, init_tracing, load_config, local_time,
    open_store, parse_pref_value, resolve_session,
};

const HISTORY_WIDTH: usize = 80;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "info" } else { "warn" });

    let config = load_config(&cli.config, cli.session)?;

    match cli.command {
        Commands::Chat => {
            let assistant = build_assistant(config).await?;
            repl::cmd_chat(&assistant).await
        }
        Commands::Ask { text, explain } => cmd_ask(config, &text.join(" "), explain).await,
        Commands::Status => cmd_status(config).await,
        Commands::History { limit } => cmd_history(&config, limit).await,
        Commands::Summary { hours } => cmd_summary(&config, hours).await,
        Commands::Patterns { json } => cmd_patterns(&config, json).await,
        Commands::Sessions => cmd_sessions(&config).await,
        Commands::Clear { yes } => cmd_clear(config, yes).await,
        Commands::Prefs { action } => cmd_prefs(&config, action).await,
    }
}

async fn build_assistant(config: NovaConfig) -> Result<Assistant> {
    let assistant = Assistant::new(config)
        .await
        .context("failed to start assistant")?;
    for err in assistant.initialization_errors() {
        tracing::warn!(skill = %err.skill, reason = %err.reason, "initialization error");
    }
    info!(session_id = %assistant.session_id(), "assistant ready");
    Ok(assistant)
}

// ---------------------------------------------------------------------------
// Subcommand: ask / status
// ---------------------------------------------------------------------------

async fn cmd_ask(config: NovaConfig, text: &str, explain: bool) -> Result<()> {
    let assistant = build_assistant(config).await?;
    let dispatch = assistant.handle_detailed(text).await;
    println!("{}", dispatch.response);
    if explain {
        match dispatch.route.skill_name() {
            Some(skill) => println!("  (route: {} -> {skill})", dispatch.route.as_str()),
            None => println!("  (route: {})", dispatch.route.as_str()),
        }
    }
    if assistant.speech_enabled() {
        assistant.speak(&dispatch.response).await;
    }
    Ok(())
}

async fn cmd_status(config: NovaConfig) -> Result<()> {
    let assistant = build_assistant(config).await?;
    println!("{}", assistant.status_report().await);
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: history / summary / patterns / sessions
// ---------------------------------------------------------------------------

async fn cmd_history(config: &NovaConfig, limit: usize) -> Result<()> {
    let store = open_store(config).await?;
    let Some(session) = resolve_session(config, &store).await? else {
        println!("  No conversations yet.");
        return Ok(());
    };

    let mut turns = store
        .recent_turns(&session, limit)
        .await
        .context("failed to read history")?;
    if turns.is_empty() {
        println!("  No conversation history for session {session}.");
        return Ok(());
    }
    turns.reverse();

    println!("  Session {session} ({} turns shown)", turns.len());
    for turn in &turns {
        println!("{}", format_turn(turn, HISTORY_WIDTH));
    }
    Ok(())
}

async fn cmd_summary(config: &NovaConfig, hours: u32) -> Result<()> {
    let store = open_store(config).await?;
    let Some(session) = resolve_session(config, &store).await? else {
        println!("  No conversations yet.");
        return Ok(());
    };
    let summary = store
        .summarize(&session, hours)
        .await
        .context("failed to summarize")?;
    println!("{summary}");
    Ok(())
}

async fn cmd_patterns(config: &NovaConfig, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let Some(session) = resolve_session(config, &store).await? else {
        println!("  No conversations yet.");
        return Ok(());
    };
    let stats = store
        .analyze_patterns(&session)
        .await
        .context("failed to analyze patterns")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("  Usage patterns for session {session}");
        println!("{}", format_patterns(&stats));
    }
    Ok(())
}

async fn cmd_sessions(config: &NovaConfig) -> Result<()> {
    let store = open_store(config).await?;
    let sessions = store.sessions().await.context("failed to list sessions")?;
    if sessions.is_empty() {
        println!("  No sessions found.");
        return Ok(());
    }

    println!("  {:<40} {:>6}  LAST ACTIVITY", "SESSION", "TURNS");
    for session in &sessions {
        println!(
            "  {:<40} {:>6}  {}",
            session.session_id,
            session.turns,
            local_time(session.last_activity)
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: clear
// ---------------------------------------------------------------------------

async fn cmd_clear(config: NovaConfig, yes: bool) -> Result<()> {
    let store = open_store(&config).await?;
    let Some(session) = resolve_session(&config, &store).await? else {
        println!("  Nothing to clear.");
        return Ok(());
    };

    if !yes && !confirm(&format!("Delete the conversation history of session {session}?"))? {
        println!("  Cancelled.");
        return Ok(());
    }

    let removed = store
        .clear(&session)
        .await
        .context("failed to clear memory")?;
    info!(session_id = %session, removed, "memory cleared");
    println!("  Removed {removed} turns from session {session}. Preferences were kept.");
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("  {question} [y/N] ");
    io::stdout().flush().ok();
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

// ---------------------------------------------------------------------------
// Subcommand: prefs
// ---------------------------------------------------------------------------

async fn cmd_prefs(config: &NovaConfig, action: PrefsAction) -> Result<()> {
    let store = open_store(config).await?;
    match action {
        PrefsAction::List => {
            let prefs = store
                .preferences()
                .await
                .context("failed to list preferences")?;
            if prefs.is_empty() {
                println!("  No preferences learned yet.");
            }
            for pref in &prefs {
                println!("{}", format_preference(pref));
            }
        }
        PrefsAction::Get { key } => match store
            .preference(&key)
            .await
            .context("failed to read preference")?
        {
            Some(pref) => println!("{}", format_preference(&pref)),
            None => println!("  No preference named '{key}'."),
        },
        PrefsAction::Set { key, value } => {
            let value = parse_pref_value(&value);
            store
                .set_preference(&key, &value)
                .await
                .context("failed to store preference")?;
            println!("  {key} = {value}");
        }
    }
    Ok(())
}
