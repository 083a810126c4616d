//! Flashcard generation through the knowledge backend.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::KnowledgeBackend;
use crate::error::{LlmError, LlmResult};

/// One question/answer card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// Ask the backend for `count` cards on `topic`.
///
/// Never fails: a backend error or unparseable reply produces a single
/// placeholder card pointing the user at manual study.
pub async fn generate_flashcards(
    backend: &dyn KnowledgeBackend,
    topic: &str,
    count: usize,
) -> Vec<Flashcard> {
    let count = count.clamp(1, 20);
    let prompt = format!(
        "Create {count} educational flashcards about \"{topic}\".\n\
         Reply with only a JSON array, each element shaped like \
         {{\"question\": \"...\", \"answer\": \"...\"}}.\n\
         Keep questions specific and answers under three sentences."
    );

    let reply = match backend.complete_raw(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, topic, "flashcard generation failed");
            return vec![fallback_card(topic)];
        }
    };

    match parse_flashcards(&reply) {
        Ok(cards) if !cards.is_empty() => cards.into_iter().take(count).collect(),
        Ok(_) => vec![fallback_card(topic)],
        Err(e) => {
            warn!(error = %e, topic, "could not parse flashcard reply");
            vec![fallback_card(topic)]
        }
    }
}

/// Extract a JSON card array from a model reply.
///
/// Accepts a ```json fenced block, or falls back to the span from the first
/// `[` to the last `]`. Cards with a blank question or answer are dropped.
pub fn parse_flashcards(reply: &str) -> LlmResult<Vec<Flashcard>> {
    let json = fenced_json(reply)
        .or_else(|| bracket_span(reply))
        .ok_or_else(|| LlmError::ParseFailed {
            reason: "no JSON array in reply".into(),
        })?;

    let cards: Vec<Flashcard> = serde_json::from_str(json)?;
    Ok(cards
        .into_iter()
        .filter(|c| !c.question.trim().is_empty() && !c.answer.trim().is_empty())
        .collect())
}

fn fenced_json(reply: &str) -> Option<&str> {
    let start = reply.find("```json")? + "```json".len();
    let rest = &reply[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

fn bracket_span(reply: &str) -> Option<&str> {
    let start = reply.find('[')?;
    let end = reply.rfind(']')?;
    (end > start).then(|| &reply[start..=end])
}

fn fallback_card(topic: &str) -> Flashcard {
    Flashcard {
        question: format!("What are the key concepts of {topic}?"),
        answer: format!(
            "Review your notes on {topic} and list its main ideas, definitions and examples."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Canned(Result<&'static str, ()>);

    #[async_trait]
    impl KnowledgeBackend for Canned {
        async fn get_answer(&self, _query: &str) -> LlmResult<String> {
            self.0.map(String::from).map_err(|_| LlmError::Timeout { seconds: 1 })
        }

        fn describe(&self) -> String {
            "canned".into()
        }
    }

    #[test]
    fn parses_fenced_block() {
        let reply = "Here you go:\n```json\n[{\"question\":\"Q1\",\"answer\":\"A1\"}]\n```\nEnjoy";
        let cards = parse_flashcards(reply).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "Q1");
    }

    #[test]
    fn parses_bare_array_with_chatter() {
        let reply = "Sure! [{\"question\":\"Q\",\"answer\":\"A\"},{\"question\":\"\",\"answer\":\"x\"}] done";
        let cards = parse_flashcards(reply).unwrap();
        assert_eq!(cards, vec![Flashcard { question: "Q".into(), answer: "A".into() }]);
    }

    #[test]
    fn rejects_reply_without_array() {
        assert!(parse_flashcards("no cards today").is_err());
    }

    #[tokio::test]
    async fn backend_failure_yields_fallback_card() {
        let cards = generate_flashcards(&Canned(Err(())), "chemistry", 5).await;
        assert_eq!(cards.len(), 1);
        assert!(cards[0].question.contains("chemistry"));
    }

    #[tokio::test]
    async fn reply_is_truncated_to_count() {
        let backend = Canned(Ok(
            r#"[{"question":"1","answer":"a"},{"question":"2","answer":"b"},{"question":"3","answer":"c"}]"#,
        ));
        let cards = generate_flashcards(&backend, "x", 2).await;
        assert_eq!(cards.len(), 2);
    }
}
