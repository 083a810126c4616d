//! Text-to-speech through an external command.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::SpeechConfig;
use crate::error::{NovaError, NovaResult};

/// Speaks text aloud.
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, text: &str) -> NovaResult<()>;

    /// Short description for the status report.
    fn describe(&self) -> String;
}

/// Build the configured speaker, or `None` when speech is disabled or no
/// engine is known for this platform.
pub fn speaker_from_config(config: &SpeechConfig) -> Option<Arc<dyn Speaker>> {
    if !config.enabled {
        return None;
    }
    let program = config
        .command
        .clone()
        .or_else(|| default_program().map(str::to_string));
    match program {
        Some(program) => Some(Arc::new(CommandSpeaker {
            program,
            rate: config.rate,
            timeout: Duration::from_secs(config.timeout_secs),
        })),
        None => {
            warn!(os = std::env::consts::OS, "speech enabled but no engine known for this platform");
            None
        }
    }
}

fn default_program() -> Option<&'static str> {
    match std::env::consts::OS {
        "macos" => Some("say"),
        "linux" | "freebsd" | "openbsd" | "netbsd" => Some("espeak"),
        _ => None,
    }
}

/// Runs `espeak -s <rate> <text>` (or `say -r <rate> <text>` on macOS),
/// killing it if it outlives the timeout.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    rate: u32,
    timeout: Duration,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, rate: u32, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            rate,
            timeout,
        }
    }

    fn rate_flag(&self) -> &'static str {
        if self.program.ends_with("say") { "-r" } else { "-s" }
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> NovaResult<()> {
        let rate = self.rate.to_string();
        // Leading dashes would be read as flags.
        let text = text.trim_start_matches('-');
        debug!(program = %self.program, chars = text.len(), "speaking");

        let child = tokio::process::Command::new(&self.program)
            .args([self.rate_flag(), rate.as_str(), text])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| NovaError::Speech {
                reason: format!("failed to start `{}`: {e}", self.program),
            })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => Err(NovaError::Speech {
                reason: format!("`{}` exited with {}", self.program, output.status),
            }),
            Ok(Err(e)) => Err(NovaError::Speech {
                reason: e.to_string(),
            }),
            Err(_) => Err(NovaError::Speech {
                reason: format!("timed out after {}s", self.timeout.as_secs()),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("{} ({} wpm)", self.program, self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_speech_has_no_speaker() {
        assert!(speaker_from_config(&SpeechConfig::default()).is_none());
    }

    #[test]
    fn explicit_command_wins() {
        let config = SpeechConfig {
            enabled: true,
            command: Some("my-tts".into()),
            ..SpeechConfig::default()
        };
        let speaker = speaker_from_config(&config).unwrap();
        assert_eq!(speaker.describe(), "my-tts (175 wpm)");
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let speaker = CommandSpeaker::new("definitely-not-a-tts-engine", 175, Duration::from_secs(1));
        assert!(matches!(speaker.speak("hi").await, Err(NovaError::Speech { .. })));
    }
}
