//! Opening websites and starting or stopping desktop apps.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};
use url::Url;

use super::launcher::{Launcher, SystemLauncher, resolve_app};
use crate::error::SkillResult;
use crate::skill::{ConsentFlags, ConsentKind, Skill, SkillContext};

const TRIGGERS: &[&str] = &["open", "close", "launch", "start", "stop"];

/// Bare site names that map straight to a URL.
const KNOWN_SITES: &[(&str, &str)] = &[
    ("youtube", "https://www.youtube.com"),
    ("google", "https://www.google.com"),
    ("github", "https://github.com"),
    ("gmail", "https://mail.google.com"),
    ("stackoverflow", "https://stackoverflow.com"),
    ("stack overflow", "https://stackoverflow.com"),
    ("wikipedia", "https://www.wikipedia.org"),
    ("reddit", "https://www.reddit.com"),
    ("netflix", "https://www.netflix.com"),
    ("linkedin", "https://www.linkedin.com"),
];

pub struct PcControl {
    launcher: Arc<dyn Launcher>,
    open_re: Regex,
    close_re: Regex,
}

impl PcControl {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        let launcher: Arc<dyn Launcher> = match &ctx.launcher {
            Some(custom) => Arc::clone(custom),
            None => Arc::new(SystemLauncher::for_current_platform(
                ctx.settings.os_action_timeout,
            )?),
        };
        Ok(Self {
            launcher,
            open_re: Regex::new(r"(?i)\b(?:open|launch|start)\s+(?:up\s+)?(?:the\s+)?(.+)")?,
            close_re: Regex::new(r"(?i)\b(?:close|stop|quit)\s+(?:the\s+)?(.+)")?,
        })
    }

    async fn open(&self, target: &str) -> Option<String> {
        if let Some(url) = to_url(target) {
            return Some(match self.launcher.open_url(&url).await {
                Ok(()) => {
                    info!(url = %url, "opened url");
                    format!("🌐 Opened {url} in your default browser.")
                }
                Err(e) => {
                    warn!(error = %e, url = %url, "failed to open url");
                    format!("⚠️ I couldn't open {url}. Please open it manually.")
                }
            });
        }

        let app = resolve_app(self.launcher.platform(), target)?;
        Some(match self.launcher.launch_app(&app).await {
            Ok(()) => format!("🚀 Launched {}.", app.display),
            Err(e) => {
                warn!(error = %e, app = %app.program, "failed to launch app");
                format!("⚠️ I couldn't launch {}. Is it installed?", app.display)
            }
        })
    }

    async fn close(&self, target: &str) -> Option<String> {
        let app = resolve_app(self.launcher.platform(), target)?;
        Some(match self.launcher.close_app(&app).await {
            Ok(()) => format!("🛑 Closed {}.", app.display),
            Err(e) => {
                warn!(error = %e, app = %app.program, "failed to close app");
                format!("⚠️ I couldn't close {}. It may not be running.", app.display)
            }
        })
    }
}

#[async_trait]
impl Skill for PcControl {
    fn name(&self) -> &'static str {
        "pc_control"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    fn required_consent(&self) -> Option<ConsentKind> {
        Some(ConsentKind::DeviceActions)
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        if let Some(caps) = self.close_re.captures(text) {
            return Ok(self.close(clean_target(&caps[1])).await);
        }
        if let Some(caps) = self.open_re.captures(text) {
            return Ok(self.open(clean_target(&caps[1])).await);
        }
        Ok(None)
    }
}

fn clean_target(raw: &str) -> &str {
    let trimmed = raw.trim().trim_end_matches(['.', '!', '?']);
    let lowered = trimmed.to_ascii_lowercase();
    let trimmed = match lowered.rfind(" please") {
        Some(i) if i + " please".len() == lowered.len() => &trimmed[..i],
        _ => trimmed,
    };
    trimmed.trim()
}

/// Turn an explicit URL, a bare domain or a known site name into a URL.
pub fn to_url(target: &str) -> Option<Url> {
    let lowered = target.to_ascii_lowercase();

    if let Some((_, url)) = KNOWN_SITES.iter().find(|(name, _)| lowered == *name) {
        return Url::parse(url).ok();
    }
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return Url::parse(target).ok();
    }
    let looks_like_domain = !target.contains(char::is_whitespace)
        && target.contains('.')
        && !target.starts_with('.')
        && !target.ends_with('.');
    if lowered.starts_with("www.") || looks_like_domain {
        return Url::parse(&format!("https://{target}"))
            .ok()
            .filter(|u| u.host_str().is_some());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sites_and_domains_become_urls() {
        assert_eq!(to_url("youtube").unwrap().as_str(), "https://www.youtube.com/");
        assert_eq!(to_url("www.rust-lang.org").unwrap().host_str(), Some("www.rust-lang.org"));
        assert_eq!(to_url("docs.rs").unwrap().as_str(), "https://docs.rs/");
        assert_eq!(
            to_url("https://example.com/a?b=c").unwrap().as_str(),
            "https://example.com/a?b=c"
        );
        assert!(to_url("calculator").is_none());
        assert!(to_url("a new project").is_none());
    }

    #[test]
    fn targets_lose_politeness_and_punctuation() {
        assert_eq!(clean_target("youtube please!"), "youtube");
        assert_eq!(clean_target(" calculator. "), "calculator");
    }
}
