//! Observation record model for a vocabulary-test session.
//!
//! The serialised field names are a contract: downstream analysis tooling
//! reads `rounds[].words[].{word,known,for}`, the per-round counters, the
//! `summary` block, and the optional `final_vocab_size`. Rust-side names may
//! differ (`anchor` serialises as `for`), but the wire shape must not drift.

use serde::{Deserialize, Serialize};

/// A single word entry observed during one round.
///
/// Identity is the `anchor` (the widget's stable per-entry key, unique
/// within a round). `known` is decided by the round executor and is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordObservation {
    pub word: String,
    pub known: bool,
    #[serde(rename = "for")]
    pub anchor: String,
}

/// Everything observed in one round of the test.
///
/// Created once per round and never mutated after the round completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub words: Vec<WordObservation>,
    pub clicked_count: usize,
    pub total_count: usize,
}

impl RoundRecord {
    /// Record for a round where no widget container (or no valid entry)
    /// was found. Not an error: later rounds may still proceed.
    pub fn empty(round: u32) -> Self {
        Self {
            round,
            words: Vec::new(),
            clicked_count: 0,
            total_count: 0,
        }
    }

    /// Build a record from a full set of observations, deriving both
    /// counters from the observations themselves.
    pub fn from_observations(round: u32, words: Vec<WordObservation>) -> Self {
        let clicked_count = words.iter().filter(|w| w.known).count();
        let total_count = words.len();
        Self {
            round,
            words,
            clicked_count,
            total_count,
        }
    }
}

/// Aggregate counters across all completed rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_rounds: usize,
    pub total_words: usize,
    pub total_clicked: usize,
}

/// The full result of one harness session.
///
/// Built incrementally as rounds complete and persisted exactly once at the
/// end of the session. A missing `final_vocab_size` marks the result as
/// partial rather than failed: the completed prefix of rounds is retained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionResult {
    pub rounds: Vec<RoundRecord>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_vocab_size: Option<String>,
}

impl SessionResult {
    /// Append a completed round and fold its counters into the summary.
    pub fn push_round(&mut self, round: RoundRecord) {
        self.summary.total_rounds += 1;
        self.summary.total_words += round.total_count;
        self.summary.total_clicked += round.clicked_count;
        self.rounds.push(round);
    }

    /// A session is complete only when the final estimate was extracted.
    pub fn is_complete(&self) -> bool {
        self.final_vocab_size.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(word: &str, known: bool, anchor: &str) -> WordObservation {
        WordObservation {
            word: word.into(),
            known,
            anchor: anchor.into(),
        }
    }

    #[test]
    fn round_counters_derive_from_observations() {
        let record = RoundRecord::from_observations(
            1,
            vec![
                obs("cat", true, "word_1"),
                obs("dog", false, "word_2"),
                obs("ubiquitous", true, "word_3"),
            ],
        );
        assert_eq!(record.total_count, 3);
        assert_eq!(record.clicked_count, 2);
        assert!(record.clicked_count <= record.total_count);
    }

    #[test]
    fn summary_accumulates_across_rounds() {
        let mut result = SessionResult::default();
        result.push_round(RoundRecord::from_observations(
            1,
            vec![obs("a", true, "word_1"), obs("b", false, "word_2")],
        ));
        result.push_round(RoundRecord::empty(2));

        assert_eq!(result.summary.total_rounds, 2);
        assert_eq!(result.summary.total_words, 2);
        assert_eq!(result.summary.total_clicked, 1);
        assert!(!result.is_complete());
    }

    #[test]
    fn wire_field_names_match_downstream_contract() {
        let mut result = SessionResult::default();
        result.push_round(RoundRecord::from_observations(
            1,
            vec![obs("cat", true, "word_9")],
        ));
        result.final_vocab_size = Some("3406".into());

        let json = serde_json::to_value(&result).unwrap();
        let word = &json["rounds"][0]["words"][0];
        assert_eq!(word["word"], "cat");
        assert_eq!(word["known"], true);
        assert_eq!(word["for"], "word_9");
        assert_eq!(json["rounds"][0]["clicked_count"], 1);
        assert_eq!(json["rounds"][0]["total_count"], 1);
        assert_eq!(json["summary"]["total_rounds"], 1);
        assert_eq!(json["summary"]["total_words"], 1);
        assert_eq!(json["summary"]["total_clicked"], 1);
        assert_eq!(json["final_vocab_size"], "3406");
    }

    #[test]
    fn partial_result_omits_final_size() {
        let result = SessionResult::default();
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("final_vocab_size"));
    }
}
