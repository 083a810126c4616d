//! Flashcard study companion.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nova_llm::{Flashcard, KnowledgeBackend, generate_flashcards};
use tracing::debug;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext, lock_state};
use crate::text::{contains_any, title_case, topic_after};

const TRIGGERS: &[&str] = &["flashcard", "study card", "quiz"];

/// Cards requested per deck.
const DECK_SIZE: usize = 5;

#[derive(Debug, Clone)]
struct Deck {
    topic: String,
    cards: Vec<Flashcard>,
}

pub struct StudyCompanion {
    backend: Option<Arc<dyn KnowledgeBackend>>,
    last_deck: Mutex<Option<Deck>>,
}

impl StudyCompanion {
    pub fn new(ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            backend: ctx.backend.clone(),
            last_deck: Mutex::new(None),
        })
    }

    fn review(&self) -> SkillResult<String> {
        Ok(match lock_state(&self.last_deck)?.as_ref() {
            Some(deck) => render(deck),
            None => "📚 No deck yet. Try `flashcards on photosynthesis`.".to_string(),
        })
    }
}

fn topic_of(text: &str) -> Option<&str> {
    ["flashcards", "flashcard", "study cards", "study card", "quiz me", "quiz"]
        .iter()
        .find_map(|kw| topic_after(text, kw))
}

fn render(deck: &Deck) -> String {
    let mut out = format!("📚 Flashcards: {}\n", deck.topic);
    for (i, card) in deck.cards.iter().enumerate() {
        out.push_str(&format!("\nQ{n}: {}\nA{n}: {}\n", card.question, card.answer, n = i + 1));
    }
    out.push_str("\nSay `review flashcards` to see this deck again.");
    out
}

fn study_guidance(topic: &str) -> String {
    format!(
        "📚 Study plan for {topic}\n\n\
         1. Write five questions you expect on {topic}.\n\
         2. Answer them from memory, then check your notes.\n\
         3. Put the ones you missed on cards and review them tomorrow.\n\n\
         Configure an API key to have me generate flashcards automatically."
    )
}

#[async_trait]
impl Skill for StudyCompanion {
    fn name(&self) -> &'static str {
        "study_companion"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        if contains_any(text, &["review flashcard", "review cards", "review study card"]) {
            return self.review().map(Some);
        }

        let topic = topic_of(text).map(title_case).unwrap_or_else(|| "General Knowledge".into());
        let Some(backend) = &self.backend else {
            return Ok(Some(study_guidance(&topic)));
        };

        let cards = generate_flashcards(backend.as_ref(), &topic, DECK_SIZE).await;
        debug!(topic = %topic, cards = cards.len(), "generated deck");
        let deck = Deck { topic, cards };
        let reply = render(&deck);
        *lock_state(&self.last_deck)? = Some(deck);
        Ok(Some(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_llm::LlmResult;
    use nova_store::MemoryStore;

    struct Cards;

    #[async_trait]
    impl KnowledgeBackend for Cards {
        async fn get_answer(&self, _query: &str) -> LlmResult<String> {
            Ok(r#"[{"question":"What is ATP?","answer":"The cell's energy currency."}]"#.into())
        }

        fn describe(&self) -> String {
            "cards".into()
        }
    }

    #[tokio::test]
    async fn deck_is_listed_and_remembered() {
        let ctx = SkillContext::new(MemoryStore::in_memory().await.unwrap(), "s")
            .with_backend(Some(Arc::new(Cards)));
        let skill = StudyCompanion::new(&ctx).unwrap();
        let consent = ConsentFlags::default();

        let reply = skill.route("flashcards on biology", &consent).await.unwrap().unwrap();
        assert!(reply.contains("Flashcards: Biology"));
        assert!(reply.contains("Q1: What is ATP?"));

        let again = skill.route("review flashcards", &consent).await.unwrap().unwrap();
        assert_eq!(again, reply);
    }

    #[tokio::test]
    async fn without_backend_gives_guidance() {
        let ctx = SkillContext::new(MemoryStore::in_memory().await.unwrap(), "s");
        let skill = StudyCompanion::new(&ctx).unwrap();
        let reply = skill
            .route("quiz me on chemistry", &ConsentFlags::default())
            .await
            .unwrap()
            .unwrap();
        assert!(reply.contains("Study plan for Chemistry"));
    }
}
