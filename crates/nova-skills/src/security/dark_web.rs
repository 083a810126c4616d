//! Breach exposure guidance.

use async_trait::async_trait;
use regex::Regex;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext};

const TRIGGERS: &[&str] = &["breach", "pwned", "leak", "compromised", "dark web"];

pub struct DarkWebWatch {
    email_re: Regex,
}

impl DarkWebWatch {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            email_re: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")?,
        })
    }
}

/// Mask the local part of an address: `alice@example.com` → `a***@example.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl Skill for DarkWebWatch {
    fn name(&self) -> &'static str {
        "dark_web_watch"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let header = match self.email_re.find(text) {
            Some(m) => format!(
                "🕵️ Breach check for {}\n\nI can't query breach databases from here, but you can \
                 check this address at https://haveibeenpwned.com.",
                mask_email(m.as_str())
            ),
            None => "🕵️ Dark Web Watch\n\nShare an e-mail address (for example `was \
                     me@example.com in a breach?`) and I'll walk you through checking it."
                .to_string(),
        };
        Ok(Some(format!(
            "{header}\n\nIf an account was exposed:\n\
             1. Change the password and any reuse of it.\n\
             2. Turn on two-factor authentication.\n\
             3. Watch for phishing that mentions the breached service.\n\
             4. Consider a password manager so every site gets a unique password."
        )))
    }
}
