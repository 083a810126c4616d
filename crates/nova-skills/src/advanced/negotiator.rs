//! Price negotiation coaching.

use async_trait::async_trait;
use regex::Regex;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, ConsentKind, Skill, SkillContext};

const TRIGGERS: &[&str] = &["negotiate", "lower price", "deal", "discount"];

pub struct Negotiator {
    price_re: Regex,
}

impl Negotiator {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            price_re: Regex::new(r"([$€£₹])\s?(\d[\d,]*(?:\.\d{1,2})?)")?,
        })
    }

    /// First currency amount in `text`, as `(symbol, value)`.
    pub fn price(&self, text: &str) -> Option<(String, f64)> {
        let caps = self.price_re.captures(text)?;
        let value = caps[2].replace(',', "").parse().ok()?;
        Some((caps[1].to_string(), value))
    }
}

#[async_trait]
impl Skill for Negotiator {
    fn name(&self) -> &'static str {
        "negotiator"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    fn required_consent(&self) -> Option<ConsentKind> {
        Some(ConsentKind::Payments)
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let mut out = String::from("💼 Negotiation Plan\n");
        if let Some((symbol, price)) = self.price(text) {
            out.push_str(&format!(
                "\n- Asking price: {symbol}{price:.2}\
                 \n- Open at: {symbol}{:.2} (about 15% lower)\
                 \n- Aim for: {symbol}{:.2}\
                 \n- Walk away above: {symbol}{:.2}\n",
                price * 0.85,
                price * 0.90,
                price * 0.95
            ));
        }
        out.push_str(
            "\nTactics:\n\
             1. Research comparable prices and mention them.\n\
             2. Ask \"is that the best you can do?\" and then stay quiet.\n\
             3. Trade instead of conceding: longer commitment, upfront payment, bundles.\n\
             4. Be ready to walk away politely.\n\n\
             I only coach; I never pay or commit on your behalf.",
        );
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::MemoryStore;

    #[tokio::test]
    async fn suggests_offers_from_asking_price() {
        let ctx = SkillContext::new(MemoryStore::in_memory().await.unwrap(), "s");
        let skill = Negotiator::new(&ctx).unwrap();
        assert_eq!(skill.price("the laptop is $1,200"), Some(("$".into(), 1200.0)));

        let reply = skill
            .route("help me negotiate, they want $1,200", &ConsentFlags::all())
            .await
            .unwrap()
            .unwrap();
        assert!(reply.contains("Open at: $1020.00"));
    }
}
