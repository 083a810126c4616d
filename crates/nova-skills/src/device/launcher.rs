//! OS launcher: the only place Nova spawns processes on the user's behalf.
//!
//! Every command the launcher waits on is bounded by a timeout and spawned
//! with `kill_on_drop(true)`, so a hung opener is killed rather than
//! blocking the router. Launched applications themselves are detached.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::{SkillError, SkillResult};

/// Host operating system families the launcher knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// The platform this binary was built for, if supported.
    pub fn current() -> Option<Self> {
        match std::env::consts::OS {
            "linux" | "freebsd" | "openbsd" | "netbsd" => Some(Self::Linux),
            "macos" => Some(Self::MacOs),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }
}

/// An application Nova can start and stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSpec {
    /// Name shown to the user.
    pub display: String,
    /// Executable (Linux, Windows) or application bundle name (macOS).
    pub program: String,
}

/// Resolve a spoken app name to a platform-specific program.
pub fn resolve_app(platform: Platform, name: &str) -> Option<AppSpec> {
    let key = name.trim().to_ascii_lowercase();
    let program = match (platform, key.as_str()) {
        (Platform::Linux, "notepad" | "text editor" | "editor") => "gedit",
        (Platform::Linux, "calculator" | "calc") => "gnome-calculator",
        (Platform::Linux, "terminal") => "gnome-terminal",
        (Platform::Linux, "files" | "file manager" | "explorer") => "nautilus",
        (Platform::Linux, "chrome") => "google-chrome",
        (Platform::MacOs, "notepad" | "text editor" | "editor") => "TextEdit",
        (Platform::MacOs, "calculator" | "calc") => "Calculator",
        (Platform::MacOs, "terminal") => "Terminal",
        (Platform::MacOs, "files" | "file manager" | "finder" | "explorer") => "Finder",
        (Platform::MacOs, "chrome") => "Google Chrome",
        (Platform::MacOs, "firefox") => "Firefox",
        (Platform::MacOs, "spotify") => "Spotify",
        (Platform::MacOs, "vscode" | "vs code" | "code") => "Visual Studio Code",
        (Platform::Windows, "notepad" | "text editor" | "editor") => "notepad.exe",
        (Platform::Windows, "calculator" | "calc") => "calc.exe",
        (Platform::Windows, "terminal" | "command prompt" | "cmd") => "cmd.exe",
        (Platform::Windows, "files" | "file manager" | "explorer") => "explorer.exe",
        (Platform::Windows, "chrome") => "chrome.exe",
        (Platform::Windows, "firefox") => "firefox.exe",
        (Platform::Windows, "spotify") => "spotify.exe",
        (_, "vscode" | "vs code" | "code") => "code",
        (_, "firefox") => "firefox",
        (_, "spotify") => "spotify",
        _ => return None,
    };
    Some(AppSpec {
        display: crate::text::title_case(&key),
        program: program.to_string(),
    })
}

/// Opens URLs and starts or stops applications.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn open_url(&self, url: &Url) -> SkillResult<()>;
    async fn launch_app(&self, app: &AppSpec) -> SkillResult<()>;
    async fn close_app(&self, app: &AppSpec) -> SkillResult<()>;

    /// Platform used to resolve app names.
    fn platform(&self) -> Platform;
}

/// [`Launcher`] backed by the host's native openers.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    platform: Platform,
    timeout: Duration,
}

impl SystemLauncher {
    /// Launcher for the current platform, or an error on unsupported hosts.
    pub fn for_current_platform(timeout: Duration) -> SkillResult<Self> {
        let platform = Platform::current().ok_or_else(|| SkillError::Unavailable {
            skill: "pc_control",
            reason: format!("unsupported platform: {}", std::env::consts::OS),
        })?;
        Ok(Self { platform, timeout })
    }

    /// Run `program args..` to completion within the timeout.
    async fn run_bounded(&self, action: &str, program: &str, args: &[&str]) -> SkillResult<()> {
        debug!(program, ?args, timeout_secs = self.timeout.as_secs(), "running os action");

        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SkillError::ActionFailed {
                action: action.to_string(),
                reason: format!("failed to spawn `{program}`: {e}"),
            })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => Err(SkillError::ActionFailed {
                action: action.to_string(),
                reason: format!(
                    "`{program}` exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }),
            Ok(Err(e)) => Err(SkillError::ActionFailed {
                action: action.to_string(),
                reason: format!("process error: {e}"),
            }),
            Err(_) => {
                warn!(program, timeout_secs = self.timeout.as_secs(), "os action timed out");
                Err(SkillError::Timeout {
                    action: action.to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }

    /// Start `program` without waiting for it to exit.
    fn spawn_detached(&self, program: &str) -> SkillResult<()> {
        tokio::process::Command::new(program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| SkillError::ActionFailed {
                action: "launch app".into(),
                reason: format!("failed to start `{program}`: {e}"),
            })
    }
}

#[async_trait]
impl Launcher for SystemLauncher {
    async fn open_url(&self, url: &Url) -> SkillResult<()> {
        let url = url.as_str();
        match self.platform {
            Platform::Linux => self.run_bounded("open url", "xdg-open", &[url]).await,
            Platform::MacOs => self.run_bounded("open url", "open", &[url]).await,
            Platform::Windows => {
                self.run_bounded("open url", "rundll32", &["url.dll,FileProtocolHandler", url])
                    .await
            }
        }
    }

    async fn launch_app(&self, app: &AppSpec) -> SkillResult<()> {
        match self.platform {
            Platform::MacOs => {
                self.run_bounded("launch app", "open", &["-a", app.program.as_str()])
                    .await
            }
            Platform::Linux | Platform::Windows => self.spawn_detached(&app.program),
        }
    }

    async fn close_app(&self, app: &AppSpec) -> SkillResult<()> {
        match self.platform {
            Platform::Linux => {
                let name = linux_process_name(&app.program);
                self.run_bounded("close app", "pkill", &["-x", name]).await
            }
            Platform::MacOs => {
                let script = format!("quit app \"{}\"", app.program.replace('"', ""));
                self.run_bounded("close app", "osascript", &["-e", script.as_str()])
                    .await
            }
            Platform::Windows => {
                self.run_bounded("close app", "taskkill", &["/IM", app.program.as_str(), "/F"])
                    .await
            }
        }
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}

/// The kernel's name for `program`, which `pkill -x` matches exactly.
/// Linux truncates process names to 15 bytes.
fn linux_process_name(program: &str) -> &str {
    const COMM_LEN: usize = 15;
    if program.len() <= COMM_LEN {
        return program;
    }
    let mut end = COMM_LEN;
    while !program.is_char_boundary(end) {
        end -= 1;
    }
    &program[..end]
}
