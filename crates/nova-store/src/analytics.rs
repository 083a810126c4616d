//! Derived statistics over the conversation log.
//!
//! Everything here is a pure function of a slice of turns. Nothing is
//! cached; callers recompute after every write.

use std::collections::{BTreeMap, HashMap};

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::conversation::{ConversationTurn, TurnRole};

/// Turns considered by [`analyze`].
pub const PATTERN_WINDOW: usize = 100;
/// Turns considered by [`summarize`].
pub const SUMMARY_WINDOW: usize = 50;

const TECHNICAL_KEYWORDS: &[&str] = &[
    "api",
    "code",
    "programming",
    "algorithm",
    "database",
    "server",
    "python",
    "javascript",
];

const ACADEMIC_KEYWORDS: &[&str] = &[
    "research",
    "study",
    "thesis",
    "paper",
    "academic",
    "university",
    "analysis",
];

/// Volume-based engagement tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    InsufficientData,
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    /// >50 high, >20 medium, otherwise low.
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Self::InsufficientData,
            n if n > 50 => Self::High,
            n if n > 20 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseDomain {
    Technical,
    Academic,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// A word and how often it appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Usage patterns computed on demand from recent turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub total_interactions: usize,
    /// Local hour of day (0-23) to turn count.
    pub hour_histogram: BTreeMap<u32, usize>,
    pub most_active_hour: Option<u32>,
    pub top_request_words: Vec<WordCount>,
    pub engagement_level: EngagementLevel,
    pub expertise_estimate: BTreeMap<ExpertiseDomain, ExpertiseLevel>,
}

impl DerivedStats {
    pub fn is_insufficient(&self) -> bool {
        self.total_interactions == 0
    }
}

/// Compute [`DerivedStats`] over `turns` (any order; sorted internally).
pub fn analyze(turns: &[ConversationTurn]) -> DerivedStats {
    let ordered = chronological(turns);

    let mut hour_histogram: BTreeMap<u32, usize> = BTreeMap::new();
    for turn in &ordered {
        let hour = turn.timestamp.with_timezone(&Local).hour();
        *hour_histogram.entry(hour).or_default() += 1;
    }

    // Earliest hour wins a tie.
    let most_active_hour = hour_histogram
        .iter()
        .fold(None::<(u32, usize)>, |best, (&hour, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((hour, count)),
        })
        .map(|(hour, _)| hour);

    let user_texts: Vec<&str> = ordered
        .iter()
        .filter(|t| t.role == TurnRole::User)
        .map(|t| t.content.as_str())
        .collect();

    let top_request_words = word_frequencies(user_texts.iter().copied(), |w| {
        w.chars().count() > 4
    })
    .into_iter()
    .take(10)
    .collect();

    DerivedStats {
        total_interactions: ordered.len(),
        hour_histogram,
        most_active_hour,
        top_request_words,
        engagement_level: EngagementLevel::from_count(ordered.len()),
        expertise_estimate: estimate_expertise(&user_texts),
    }
}

/// Render the textual activity summary for turns inside a window.
pub fn summarize(turns: &[ConversationTurn], window_hours: u32) -> String {
    if turns.is_empty() {
        return "No recent conversations.".to_string();
    }

    let ordered = chronological(turns);
    let user = ordered.iter().filter(|t| t.role == TurnRole::User).count();
    let assistant = ordered.len() - user;

    let topics: Vec<String> = word_frequencies(ordered.iter().map(|t| t.content.as_str()), |w| {
        w.chars().count() > 3 && w.chars().all(char::is_alphabetic)
    })
    .into_iter()
    .take(5)
    .map(|wc| wc.word)
    .collect();

    let mut out = format!(
        "Recent Activity Summary ({window_hours} hours):\n\
         - Total messages: {}\n\
         - Your messages: {user}\n\
         - Assistant responses: {assistant}",
        ordered.len()
    );
    if !topics.is_empty() {
        out.push_str(&format!("\n- Common topics: {}", topics.join(", ")));
    }
    out
}

/// Count lowercased words passing `keep`, most frequent first.
///
/// The sort is stable over first-appearance order, so on equal counts the
/// word seen first ranks higher.
pub fn word_frequencies<'a>(
    texts: impl IntoIterator<Item = &'a str>,
    keep: impl Fn(&str) -> bool,
) -> Vec<WordCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<WordCount> = Vec::new();

    for text in texts {
        for raw in text.split_whitespace() {
            let word = raw
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.is_empty() || !keep(&word) {
                continue;
            }
            match index.get(&word) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(word.clone(), counts.len());
                    counts.push(WordCount { word, count: 1 });
                }
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn estimate_expertise(user_texts: &[&str]) -> BTreeMap<ExpertiseDomain, ExpertiseLevel> {
    let mut estimate = BTreeMap::new();
    if user_texts.is_empty() {
        return estimate;
    }

    let lowered: Vec<String> = user_texts.iter().map(|t| t.to_lowercase()).collect();
    let hits = |keywords: &[&str]| -> usize {
        lowered
            .iter()
            .map(|t| keywords.iter().filter(|k| t.contains(*k)).count())
            .sum()
    };

    let technical = hits(TECHNICAL_KEYWORDS);
    let technical_level = match technical {
        n if n > 5 => Some(ExpertiseLevel::Advanced),
        n if n > 2 => Some(ExpertiseLevel::Intermediate),
        n if n > 0 => Some(ExpertiseLevel::Beginner),
        _ => None,
    };
    if let Some(level) = technical_level {
        estimate.insert(ExpertiseDomain::Technical, level);
    }

    let academic = hits(ACADEMIC_KEYWORDS);
    let academic_level = match academic {
        n if n > 3 => Some(ExpertiseLevel::Advanced),
        n if n > 1 => Some(ExpertiseLevel::Intermediate),
        n if n > 0 => Some(ExpertiseLevel::Beginner),
        _ => None,
    };
    if let Some(level) = academic_level {
        estimate.insert(ExpertiseDomain::Academic, level);
    }

    let words: usize = user_texts.iter().map(|t| t.split_whitespace().count()).sum();
    let mean = words as f64 / user_texts.len() as f64;
    let general = if mean > 15.0 {
        ExpertiseLevel::Advanced
    } else if mean > 8.0 {
        ExpertiseLevel::Intermediate
    } else {
        ExpertiseLevel::Beginner
    };
    estimate.insert(ExpertiseDomain::General, general);

    estimate
}

/// Arrival (insertion id) order.
fn chronological(turns: &[ConversationTurn]) -> Vec<&ConversationTurn> {
    let mut ordered: Vec<&ConversationTurn> = turns.iter().collect();
    ordered.sort_by_key(|t| t.id);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn turn(id: i64, role: TurnRole, content: &str) -> ConversationTurn {
        ConversationTurn {
            id,
            session_id: "s".into(),
            role,
            content: content.into(),
            timestamp: Utc::now() - Duration::seconds(1_000 - id),
            metadata: Default::default(),
        }
    }

    #[test]
    fn engagement_thresholds() {
        assert_eq!(EngagementLevel::from_count(0), EngagementLevel::InsufficientData);
        assert_eq!(EngagementLevel::from_count(20), EngagementLevel::Low);
        assert_eq!(EngagementLevel::from_count(21), EngagementLevel::Medium);
        assert_eq!(EngagementLevel::from_count(50), EngagementLevel::Medium);
        assert_eq!(EngagementLevel::from_count(51), EngagementLevel::High);
    }

    #[test]
    fn frequency_ties_keep_first_seen_order() {
        let words = word_frequencies(["zebra apple", "apple zebra mango"], |_| true);
        assert_eq!(words[0].word, "zebra");
        assert_eq!(words[1].word, "apple");
        assert_eq!(words[2].word, "mango");
    }

    #[test]
    fn analyze_counts_only_user_words() {
        let turns = vec![
            turn(1, TurnRole::User, "schedule physics revision"),
            turn(2, TurnRole::Assistant, "assistant verbose answer answer answer"),
            turn(3, TurnRole::User, "physics flashcards"),
        ];
        let stats = analyze(&turns);
        assert_eq!(stats.total_interactions, 3);
        assert_eq!(stats.top_request_words[0].word, "physics");
        assert_eq!(stats.top_request_words[0].count, 2);
        assert!(stats.top_request_words.iter().all(|w| w.word != "answer"));
        assert_eq!(stats.engagement_level, EngagementLevel::Low);
        assert!(stats.most_active_hour.is_some());
    }

    #[test]
    fn analyze_empty_is_insufficient() {
        let stats = analyze(&[]);
        assert!(stats.is_insufficient());
        assert_eq!(stats.engagement_level, EngagementLevel::InsufficientData);
        assert!(stats.most_active_hour.is_none());
        assert!(stats.expertise_estimate.is_empty());
    }

    #[test]
    fn expertise_tiers() {
        let turns: Vec<_> = (0..3)
            .map(|i| turn(i, TurnRole::User, "python api database question"))
            .collect();
        let stats = analyze(&turns);
        assert_eq!(
            stats.expertise_estimate.get(&ExpertiseDomain::Technical),
            Some(&ExpertiseLevel::Advanced)
        );
        assert!(!stats.expertise_estimate.contains_key(&ExpertiseDomain::Academic));
        assert_eq!(
            stats.expertise_estimate.get(&ExpertiseDomain::General),
            Some(&ExpertiseLevel::Beginner)
        );
    }

    #[test]
    fn summary_lists_counts_and_topics() {
        let turns = vec![
            turn(1, TurnRole::User, "explain photosynthesis please"),
            turn(2, TurnRole::Assistant, "photosynthesis converts light"),
        ];
        let text = summarize(&turns, 24);
        assert!(text.starts_with("Recent Activity Summary (24 hours):"));
        assert!(text.contains("Total messages: 2"));
        assert!(text.contains("Your messages: 1"));
        assert!(text.contains("Common topics: photosynthesis"));
    }

    #[test]
    fn summary_of_nothing() {
        assert_eq!(summarize(&[], 24), "No recent conversations.");
    }
}
