//! Phishing indicator scoring for pasted messages.

use async_trait::async_trait;
use regex::Regex;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext};

const TRIGGERS: &[&str] = &["threat", "scan threats", "phishing", "suspicious"];

const URGENCY: &[&str] = &["urgent", "immediately", "within 24 hours", "act now", "suspended"];
const CREDENTIALS: &[&str] = &["password", "verify your account", "login", "ssn", "bank details"];
const SHORTENERS: &[&str] = &["bit.ly", "tinyurl", "t.co/", "goo.gl"];

/// Risk assessment for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreatReport {
    pub score: u32,
    pub findings: Vec<&'static str>,
}

impl ThreatReport {
    pub fn level(&self) -> &'static str {
        match self.score {
            0 => "🟢 Low",
            1..=3 => "🟡 Medium",
            _ => "🔴 High",
        }
    }
}

pub struct ThreatMode {
    ip_link_re: Regex,
}

impl ThreatMode {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            ip_link_re: Regex::new(r"https?://\d{1,3}(?:\.\d{1,3}){3}")?,
        })
    }

    pub fn assess(&self, message: &str) -> ThreatReport {
        let lowered = message.to_lowercase();
        let mut report = ThreatReport {
            score: 0,
            findings: Vec::new(),
        };
        let mut flag = |hit: bool, weight: u32, finding: &'static str| {
            if hit {
                report.score += weight;
                report.findings.push(finding);
            }
        };

        flag(
            URGENCY.iter().any(|w| lowered.contains(w)),
            2,
            "Pressure or urgency language",
        );
        flag(
            CREDENTIALS.iter().any(|w| lowered.contains(w)),
            2,
            "Asks for credentials or personal data",
        );
        flag(
            self.ip_link_re.is_match(&lowered),
            3,
            "Link points at a raw IP address",
        );
        flag(
            SHORTENERS.iter().any(|w| lowered.contains(w)),
            1,
            "Shortened link hides the destination",
        );
        report
    }
}

#[async_trait]
impl Skill for ThreatMode {
    fn name(&self) -> &'static str {
        "threat_mode"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let Some(message) = text.split_once(':').map(|(_, m)| m.trim()).filter(|m| !m.is_empty())
        else {
            return Ok(Some(
                "🛡️ Threat Mode\n\nPaste a suspicious message after a colon, for example:\n\
                 `is this phishing: Your account is suspended, verify your password at http://...`"
                    .to_string(),
            ));
        };

        let report = self.assess(message);
        let mut out = format!("🛡️ Threat assessment: {}\n", report.level());
        if report.findings.is_empty() {
            out.push_str("\nNo common phishing indicators found. Stay cautious with unexpected links.");
        } else {
            for finding in &report.findings {
                out.push_str(&format!("\n- {finding}"));
            }
            out.push_str("\n\nDon't click links or reply. Contact the sender through an official channel.");
        }
        Ok(Some(out))
    }
}
