//! Practice tests and score prediction.
//!
//! Question sets are fixed per subject so a test can be retaken and scored
//! with `answers: 1=b, 2=a, ...`.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use regex::Regex;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext, lock_state};
use crate::text::contains_any;

const TRIGGERS: &[&str] = &["practice test", "predict score", "exam prep", "answers:"];

/// Share of correct answers needed for a "likely pass".
const PASS_RATIO: f64 = 0.6;

struct Question {
    prompt: &'static str,
    options: [&'static str; 3],
    /// Index into `options`.
    correct: usize,
}

struct Subject {
    name: &'static str,
    keywords: &'static [&'static str],
    questions: &'static [Question],
}

const SUBJECTS: &[Subject] = &[
    Subject {
        name: "Math",
        keywords: &["math", "algebra", "calculus"],
        questions: &[
            Question { prompt: "What is the derivative of x²?", options: ["x", "2x", "x³/3"], correct: 1 },
            Question { prompt: "Solve 3x + 6 = 0.", options: ["x = -2", "x = 2", "x = 3"], correct: 0 },
            Question { prompt: "What is 7 × 8?", options: ["54", "56", "64"], correct: 1 },
            Question { prompt: "The sum of angles in a triangle is?", options: ["90°", "360°", "180°"], correct: 2 },
        ],
    },
    Subject {
        name: "Python",
        keywords: &["python", "programming", "coding"],
        questions: &[
            Question { prompt: "Which keyword defines a function?", options: ["func", "def", "fn"], correct: 1 },
            Question { prompt: "What does len([1, 2, 3]) return?", options: ["3", "2", "6"], correct: 0 },
            Question { prompt: "Which type is immutable?", options: ["list", "dict", "tuple"], correct: 2 },
            Question { prompt: "How do you start a comment?", options: ["#", "//", "--"], correct: 0 },
        ],
    },
    Subject {
        name: "General",
        keywords: &[],
        questions: &[
            Question { prompt: "What is H₂O?", options: ["Salt", "Water", "Oxygen"], correct: 1 },
            Question { prompt: "Which planet is the largest?", options: ["Jupiter", "Saturn", "Earth"], correct: 0 },
            Question { prompt: "How many continents are there?", options: ["5", "6", "7"], correct: 2 },
        ],
    },
];

const LETTERS: [char; 3] = ['a', 'b', 'c'];

fn subject_for(text: &str) -> &'static Subject {
    let lowered = text.to_ascii_lowercase();
    SUBJECTS
        .iter()
        .find(|s| s.keywords.iter().any(|k| lowered.contains(k)))
        .unwrap_or(&SUBJECTS[SUBJECTS.len() - 1])
}

/// Result of grading one answer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 * 100.0 / self.total as f64
    }

    pub fn likely_pass(&self) -> bool {
        self.total > 0 && self.correct as f64 / self.total as f64 >= PASS_RATIO
    }
}

pub struct ExamPrep {
    answer_re: Regex,
    /// Subject of the most recently issued test.
    current: Mutex<Option<&'static str>>,
    /// Percentages of graded attempts, per subject.
    history: Mutex<BTreeMap<&'static str, Vec<f64>>>,
}

impl ExamPrep {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            answer_re: Regex::new(r"(?i)(\d+)\s*[=:)\-]\s*([abc])\b")?,
            current: Mutex::new(None),
            history: Mutex::new(BTreeMap::new()),
        })
    }

    /// Parse `1=b, 2=a` into `(question index, option index)` pairs.
    fn parse_answers(&self, sheet: &str) -> BTreeMap<usize, usize> {
        self.answer_re
            .captures_iter(sheet)
            .filter_map(|caps| {
                let n: usize = caps[1].parse().ok()?;
                let letter = caps[2].to_ascii_lowercase().chars().next()?;
                let option = LETTERS.iter().position(|l| *l == letter)?;
                n.checked_sub(1).map(|q| (q, option))
            })
            .collect()
    }

    fn practice_test(&self, subject: &'static Subject) -> SkillResult<String> {
        *lock_state(&self.current)? = Some(subject.name);
        let mut out = format!("📝 {} Practice Test\n", subject.name);
        for (i, q) in subject.questions.iter().enumerate() {
            out.push_str(&format!("\n{}. {}\n", i + 1, q.prompt));
            for (letter, option) in LETTERS.iter().zip(q.options) {
                out.push_str(&format!("   {letter}) {option}\n"));
            }
        }
        out.push_str("\nReply with `answers: 1=a, 2=b, ...` to get scored.");
        Ok(out)
    }

    fn grade(&self, sheet: &str) -> SkillResult<String> {
        let name = (*lock_state(&self.current)?).unwrap_or("General");
        let subject = SUBJECTS
            .iter()
            .find(|s| s.name == name)
            .unwrap_or(&SUBJECTS[SUBJECTS.len() - 1]);
        let answers = self.parse_answers(sheet);
        let score = Score {
            correct: subject
                .questions
                .iter()
                .enumerate()
                .filter(|(i, q)| answers.get(i) == Some(&q.correct))
                .count(),
            total: subject.questions.len(),
        };
        lock_state(&self.history)?
            .entry(subject.name)
            .or_default()
            .push(score.percent());

        let mut out = format!(
            "✅ {} score: {}/{} ({:.0}%)\n",
            subject.name,
            score.correct,
            score.total,
            score.percent()
        );
        for (i, q) in subject.questions.iter().enumerate() {
            if answers.get(&i) != Some(&q.correct) {
                out.push_str(&format!(
                    "\n{}. {} → {}) {}",
                    i + 1,
                    q.prompt,
                    LETTERS[q.correct],
                    q.options[q.correct]
                ));
            }
        }
        out.push_str(if score.likely_pass() {
            "\n\nLikely pass. Keep it up!"
        } else {
            "\n\nNeeds more practice before the exam."
        });
        Ok(out)
    }

    fn predict(&self, subject: &'static Subject) -> SkillResult<String> {
        let history = lock_state(&self.history)?;
        let Some(attempts) = history.get(subject.name).filter(|a| !a.is_empty()) else {
            return Ok(format!(
                "🔮 No graded attempts for {} yet. Say `practice test {}` first.",
                subject.name,
                subject.name.to_lowercase()
            ));
        };
        let recent: Vec<f64> = attempts.iter().rev().take(3).copied().collect();
        let predicted = recent.iter().sum::<f64>() / recent.len() as f64;
        Ok(format!(
            "🔮 Predicted {} score: {predicted:.0}% (from your last {} attempt(s)). {}",
            subject.name,
            recent.len(),
            if predicted >= PASS_RATIO * 100.0 { "Likely pass." } else { "At risk; review the missed topics." }
        ))
    }
}

#[async_trait]
impl Skill for ExamPrep {
    fn name(&self) -> &'static str {
        "exam_prep"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        if let Some((_, sheet)) = text.to_ascii_lowercase().split_once("answers:") {
            return self.grade(sheet).map(Some);
        }
        let subject = subject_for(text);
        if contains_any(text, &["predict score"]) {
            return self.predict(subject).map(Some);
        }
        self.practice_test(subject).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::MemoryStore;

    async fn skill() -> ExamPrep {
        let ctx = SkillContext::new(MemoryStore::in_memory().await.unwrap(), "s");
        ExamPrep::new(&ctx).unwrap()
    }

    #[tokio::test]
    async fn practice_test_is_deterministic() {
        let skill = skill().await;
        let consent = ConsentFlags::default();
        let a = skill.route("practice test math", &consent).await.unwrap().unwrap();
        let b = skill.route("practice test math", &consent).await.unwrap().unwrap();
        assert_eq!(a, b);
        assert!(a.contains("Math Practice Test"));
        assert!(a.contains("b) 2x"));
    }

    #[tokio::test]
    async fn grading_and_prediction() {
        let skill = skill().await;
        let consent = ConsentFlags::default();
        skill.route("practice test python", &consent).await.unwrap();

        let graded = skill
            .route("answers: 1=b, 2=a, 3=c, 4=b", &consent)
            .await
            .unwrap()
            .unwrap();
        assert!(graded.contains("Python score: 3/4 (75%)"));
        assert!(graded.contains("Likely pass"));

        let predicted = skill.route("predict score python", &consent).await.unwrap().unwrap();
        assert!(predicted.contains("Predicted Python score: 75%"));
    }

    #[test]
    fn score_threshold() {
        assert!(Score { correct: 3, total: 5 }.likely_pass());
        assert!(!Score { correct: 2, total: 5 }.likely_pass());
        assert!(!Score { correct: 0, total: 0 }.likely_pass());
    }
}
