//! The capability seam between session logic and the live browser.
//!
//! Everything above this trait is pure orchestration and is tested against
//! an in-memory fake; only [`crate::live::LiveSurface`] talks WebDriver.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// One enumerated word entry from the test widget.
///
/// Carries data only. The live DOM handle stays inside the surface and is
/// resolved by `index` at activation time, so a stale reference never
/// escapes into session logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    /// Position within the current enumeration pass.
    pub index: usize,
    /// Visible word text.
    pub word: String,
    /// The label's `for` attribute, used as the stable identity of the entry.
    pub anchor: String,
}

/// A single activation strategy for marking a word as known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Click the checkbox input nested inside the label.
    Checkbox,
    /// Click the text span nested inside the label.
    Text,
    /// Script-driven click on the label, bypassing interactability checks.
    ForcedClick,
}

/// Ordered fallback ladder. The first strategy that succeeds wins and the
/// remaining tiers are never attempted.
pub const ACTIVATION_LADDER: [Activation; 3] =
    [Activation::Checkbox, Activation::Text, Activation::ForcedClick];

/// One snapshot of the signals the verification gate evaluates.
#[derive(Debug, Clone, Default)]
pub struct GateSignals {
    /// Any challenge marker matched in the DOM.
    pub challenge_present: bool,
    /// A challenge marker is not just present but currently displayed.
    pub challenge_visible: bool,
    /// The page title carries none of the known challenge phrases.
    pub title_clear: bool,
    /// At least one target-page marker matched.
    pub target_markers_present: bool,
    /// The current URL contains the target path marker.
    pub on_target_path: bool,
    /// The page body mentions the target content.
    pub body_mentions_target: bool,
    pub current_url: String,
}

impl GateSignals {
    /// How many of the four independent confirmation checks pass. The gate
    /// requires a configurable quorum of these before declaring the
    /// challenge resolved.
    pub fn passed_checks(&self) -> usize {
        [
            self.title_clear,
            self.target_markers_present,
            self.on_target_path,
            self.body_mentions_target,
        ]
        .iter()
        .filter(|passed| **passed)
        .count()
    }
}

/// Page-level operations the session logic drives.
#[async_trait]
pub trait VocabSurface: Send + Sync {
    /// Collect a fresh snapshot of gate signals from the page.
    async fn gate_signals(&self) -> Result<GateSignals>;

    /// Wait up to `budget` for the document to report ready. Returns whether
    /// readiness was observed; a miss is reported, not fatal.
    async fn settle_ready(&self, budget: Duration) -> Result<bool>;

    /// Enumerate the word entries currently offered by the test widget.
    /// Stashes live handles internally for later activation by index.
    async fn enumerate_entries(&self) -> Result<Vec<WordEntry>>;

    /// Bring the entry at `index` into the viewport.
    async fn scroll_entry_into_view(&self, index: usize) -> Result<()>;

    /// Mark the entry at `index` as known using the given strategy.
    async fn activate_entry(&self, index: usize, how: Activation) -> Result<()>;

    /// Click the continue control if present. Returns whether a control was
    /// found and clicked.
    async fn click_continue(&self) -> Result<bool>;

    /// Read the final vocabulary-size figure from the results view, if it
    /// has rendered.
    async fn read_final_size(&self) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passed_checks_counts_only_confirmation_signals() {
        let mut signals = GateSignals {
            challenge_present: true,
            challenge_visible: true,
            ..GateSignals::default()
        };
        assert_eq!(signals.passed_checks(), 0);

        signals.title_clear = true;
        signals.on_target_path = true;
        assert_eq!(signals.passed_checks(), 2);

        signals.target_markers_present = true;
        signals.body_mentions_target = true;
        assert_eq!(signals.passed_checks(), 4);
    }

    #[test]
    fn ladder_is_ordered_cheapest_first() {
        assert_eq!(ACTIVATION_LADDER[0], Activation::Checkbox);
        assert_eq!(ACTIVATION_LADDER[2], Activation::ForcedClick);
    }
}
