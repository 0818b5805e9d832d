//! One round of the vocabulary test: enumerate, sample, activate, record.

use crate::surface::{VocabSurface, WordEntry, ACTIVATION_LADDER};
use rand::rngs::OsRng;
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use wordgauge_common::records::{RoundRecord, WordObservation};

/// Settle pause before each activation attempt, after scrolling the entry
/// into view.
const PRE_ATTEMPT_SETTLE: Duration = Duration::from_millis(500);

/// Pick `requested` distinct entry indices. Clamps to the population size;
/// an empty population yields an empty pick.
pub fn sample_indices<R>(rng: &mut R, total: usize, requested: usize) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    if total == 0 || requested == 0 {
        return Vec::new();
    }
    let amount = requested.min(total);
    rand::seq::index::sample(rng, total, amount).into_vec()
}

/// Build the round record from the full enumeration and the set of anchors
/// that were actually activated. Entries the page offered but we did not
/// (or could not) click are recorded as unknown.
pub fn assemble_round(
    round: u32,
    entries: &[WordEntry],
    activated: &HashSet<String>,
) -> RoundRecord {
    let words = entries
        .iter()
        .map(|entry| WordObservation {
            word: entry.word.clone(),
            known: activated.contains(&entry.anchor),
            anchor: entry.anchor.clone(),
        })
        .collect();
    RoundRecord::from_observations(round, words)
}

/// Execute one round: enumerate the widget, mark a random sample of entries
/// as known, and return what happened. Per-entry failures demote the entry
/// to unknown rather than failing the round; an empty or unreadable widget
/// yields an empty record so the session can still report.
pub async fn run_round<S, R>(
    surface: &S,
    rng: &mut R,
    round: u32,
    requested: usize,
) -> RoundRecord
where
    S: VocabSurface + ?Sized,
    R: Rng,
{
    let entries = match surface.enumerate_entries().await {
        Ok(entries) => entries,
        Err(err) => {
            warn!(round, error = %err, "word enumeration failed");
            Vec::new()
        }
    };
    if entries.is_empty() {
        warn!(round, "no word entries found; recording an empty round");
        return RoundRecord::empty(round);
    }
    info!(round, total = entries.len(), requested, "round started");

    let picks = sample_indices(rng, entries.len(), requested);
    let mut activated = HashSet::new();

    for pick in picks {
        let entry = &entries[pick];
        if activate_with_ladder(surface, entry).await {
            activated.insert(entry.anchor.clone());
            // Human-like pause between clicks.
            let pause = OsRng.gen_range(500..=1500);
            sleep(Duration::from_millis(pause)).await;
        } else {
            warn!(round, word = %entry.word, "all activation strategies failed");
        }
    }

    let record = assemble_round(round, &entries, &activated);
    info!(
        round,
        clicked = record.clicked_count,
        total = record.total_count,
        "round finished"
    );
    record
}

/// Try each activation strategy in order until one succeeds.
async fn activate_with_ladder<S>(surface: &S, entry: &WordEntry) -> bool
where
    S: VocabSurface + ?Sized,
{
    for strategy in ACTIVATION_LADDER {
        if let Err(err) = surface.scroll_entry_into_view(entry.index).await {
            debug!(word = %entry.word, error = %err, "scroll failed before activation");
        }
        sleep(PRE_ATTEMPT_SETTLE).await;

        match surface.activate_entry(entry.index, strategy).await {
            Ok(()) => {
                debug!(word = %entry.word, ?strategy, "entry activated");
                return true;
            }
            Err(err) => {
                debug!(word = %entry.word, ?strategy, error = %err, "activation attempt failed");
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entries(n: usize) -> Vec<WordEntry> {
        (0..n)
            .map(|i| WordEntry {
                index: i,
                word: format!("word{i}"),
                anchor: format!("word_{i}"),
            })
            .collect()
    }

    #[test]
    fn sample_yields_distinct_in_range_indices() {
        let mut rng = StdRng::seed_from_u64(7);
        let picks = sample_indices(&mut rng, 40, 5);
        assert_eq!(picks.len(), 5);
        let distinct: HashSet<_> = picks.iter().collect();
        assert_eq!(distinct.len(), 5);
        assert!(picks.iter().all(|&i| i < 40));
    }

    #[test]
    fn sample_clamps_to_population() {
        let mut rng = StdRng::seed_from_u64(7);
        let picks = sample_indices(&mut rng, 3, 10);
        assert_eq!(picks.len(), 3);
    }

    #[test]
    fn sample_of_empty_population_is_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(sample_indices(&mut rng, 0, 5).is_empty());
        assert!(sample_indices(&mut rng, 5, 0).is_empty());
    }

    #[test]
    fn assembly_records_every_offered_word() {
        let entries = entries(4);
        let activated: HashSet<String> = ["word_1".to_string(), "word_3".to_string()].into();

        let record = assemble_round(2, &entries, &activated);
        assert_eq!(record.round, 2);
        assert_eq!(record.total_count, 4);
        assert_eq!(record.clicked_count, 2);
        assert!(!record.words[0].known);
        assert!(record.words[1].known);
        assert!(record.words[3].known);
    }

    #[test]
    fn failed_activation_is_a_demotion_not_an_omission() {
        let entries = entries(3);
        // Only one of two intended activations landed.
        let activated: HashSet<String> = ["word_0".to_string()].into();

        let record = assemble_round(1, &entries, &activated);
        assert_eq!(record.total_count, 3);
        assert_eq!(record.clicked_count, 1);
    }
}
