//! Key-point extraction from pasted lecture notes or transcripts.

use async_trait::async_trait;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, ConsentKind, Skill, SkillContext};
use crate::text::sentences;

const TRIGGERS: &[&str] = &["summarize lecture", "transcribe lecture", "class notes"];

/// Sentences containing these score higher.
const CUE_WORDS: &[&str] = &[
    "important",
    "key",
    "remember",
    "definition",
    "means",
    "because",
    "therefore",
    "exam",
    "formula",
];

const MAX_POINTS: usize = 5;

pub struct Lecture;

impl Lecture {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self)
    }
}

/// The highest-scoring sentences of `body`, in their original order.
pub fn key_points(body: &str, max: usize) -> Vec<&str> {
    let all = sentences(body);
    let mut scored: Vec<(usize, usize)> = all
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let lowered = s.to_lowercase();
            let cues = CUE_WORDS.iter().filter(|w| lowered.contains(*w)).count();
            let words = s.split_whitespace().count();
            (i, cues * 10 + words.min(25))
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut chosen: Vec<usize> = scored.into_iter().take(max).map(|(i, _)| i).collect();
    chosen.sort_unstable();
    chosen.into_iter().map(|i| all[i]).collect()
}

#[async_trait]
impl Skill for Lecture {
    fn name(&self) -> &'static str {
        "lecture"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    fn required_consent(&self) -> Option<ConsentKind> {
        Some(ConsentKind::Recording)
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let body = text.split_once(':').map(|(_, b)| b.trim()).unwrap_or("");
        if body.is_empty() {
            return Ok(Some(
                "🎓 Paste your notes or transcript after a colon, e.g. \
                 `summarize lecture: <text>`. Live recording isn't available in this build."
                    .into(),
            ));
        }

        let points = key_points(body, MAX_POINTS);
        let mut out = String::from("🎓 Lecture Summary\n");
        for point in &points {
            out.push_str(&format!("\n• {point}"));
        }
        out.push_str(&format!(
            "\n\n{} of {} sentences kept.",
            points.len(),
            sentences(body).len()
        ));
        Ok(Some(out))
    }
}
