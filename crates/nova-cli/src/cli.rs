//! CLI argument definitions for Nova.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use clap::{Parser, Subcommand};
use nova_core::DEFAULT_CONFIG_PATH;

/// Nova -- a keyword-routed personal assistant.
#[derive(Parser)]
#[command(
    name = "nova",
    version,
    about = "Nova -- keyword-routed personal assistant",
    long_about = "A chat assistant that routes each request to a built-in skill by keyword, \
                  falls back to an LLM for general questions, and remembers your \
                  conversations and preferences in a local SQLite store."
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Session to use instead of the configured one.
    #[arg(long, short, global = true)]
    pub session: Option<String>,

    /// Log at info level instead of warn.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat.
    Chat,

    /// Send a single request and print the reply.
    Ask {
        /// The request text.
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,

        /// Also print the route the request took.
        #[arg(long)]
        explain: bool,
    },

    /// Show the device status report.
    Status,

    /// Show recent conversation turns.
    History {
        /// Maximum number of turns to show.
        #[arg(long, short, default_value_t = 20)]
        limit: usize,
    },

    /// Summarize recent activity.
    Summary {
        /// Look-back window in hours.
        #[arg(long, default_value_t = 24)]
        hours: u32,
    },

    /// Show usage patterns derived from the conversation log.
    Patterns {
        /// Print the raw statistics as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List stored sessions.
    Sessions,

    /// Delete the session's conversation turns. Preferences are kept.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Inspect or change learned preferences.
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// List every stored preference.
    List,

    /// Print one preference.
    Get {
        /// Preference key.
        key: String,
    },

    /// Store a preference. Values that parse as JSON are stored as JSON,
    /// anything else as a string.
    Set {
        /// Preference key.
        key: String,

        /// New value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_collects_trailing_words() {
        let cli = Cli::try_parse_from(["nova", "ask", "open", "youtube"]).unwrap();
        match cli.command {
            Commands::Ask { text, explain } => {
                assert_eq!(text, vec!["open", "youtube"]);
                assert!(!explain);
            }
            _ => panic!("expected ask"),
        }
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli =
            Cli::try_parse_from(["nova", "history", "--session", "work", "-v", "--limit", "5"])
                .unwrap();
        assert_eq!(cli.session.as_deref(), Some("work"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::History { limit: 5 }));
    }

    #[test]
    fn prefs_set_takes_key_and_value() {
        let cli = Cli::try_parse_from(["nova", "prefs", "set", "voice_tone", "calm"]).unwrap();
        match cli.command {
            Commands::Prefs {
                action: PrefsAction::Set { key, value },
            } => {
                assert_eq!(key, "voice_tone");
                assert_eq!(value, "calm");
            }
            _ => panic!("expected prefs set"),
        }
    }
}
