//! Verification-gate handling.
//!
//! [`GateMachine`] is a pure state machine advanced by signal snapshots;
//! [`wait_for_target`] is the async host that feeds it from a
//! [`VocabSurface`], handles operator interrupts, and applies the
//! post-resolution settle.

use crate::surface::{GateSignals, VocabSurface};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wordgauge_common::{GaugeError, Result};

/// Pause applied once after the challenge clears, before the widget is
/// touched. Cloudflare hands off to the real page asynchronously.
const POST_GATE_SETTLE: Duration = Duration::from_secs(10);

/// Budget for the best-effort readiness check after the settle pause.
const READY_CHECK_BUDGET: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No snapshot observed yet.
    Unknown,
    /// Challenge markers found; the gate is in front of us.
    ChallengeDetected,
    /// The target page is confirmed (or was never gated).
    TargetConfirmed,
    /// The wait ceiling elapsed without confirmation.
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Hard ceiling on the total verification wait.
    pub ceiling: Duration,
    /// Interval between signal snapshots.
    pub poll_interval: Duration,
    /// How many of the four confirmation checks must pass.
    pub confirm_threshold: usize,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            ceiling: Duration::from_secs(300),
            poll_interval: Duration::from_secs(3),
            confirm_threshold: 2,
        }
    }
}

/// Pure gate state machine. Holds no I/O; callers feed it snapshots.
#[derive(Debug)]
pub struct GateMachine {
    state: GateState,
    elapsed: Duration,
    last_url: Option<String>,
    ceiling: Duration,
    confirm_threshold: usize,
}

impl GateMachine {
    pub fn new(ceiling: Duration, confirm_threshold: usize) -> Self {
        Self {
            state: GateState::Unknown,
            elapsed: Duration::ZERO,
            last_url: None,
            ceiling,
            confirm_threshold,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Classify the initial snapshot. A page with neither challenge nor
    /// target markers is treated as already past the gate; the markers are
    /// best-effort and must not block an unrecognized but working page.
    pub fn observe(&mut self, signals: &GateSignals) -> GateState {
        self.last_url = Some(signals.current_url.clone());
        self.state = if signals.challenge_present {
            GateState::ChallengeDetected
        } else {
            GateState::TargetConfirmed
        };
        self.state
    }

    /// Advance by one poll cycle. Confirmation requires the check quorum
    /// AND no challenge element still visibly rendered.
    pub fn tick(&mut self, signals: &GateSignals, dt: Duration) -> GateState {
        if self.state != GateState::ChallengeDetected {
            return self.state;
        }
        self.elapsed += dt;

        let url_changed = self.last_url.as_deref() != Some(signals.current_url.as_str());
        if url_changed {
            debug!(url = %signals.current_url, "url changed during verification wait");
        }
        self.last_url = Some(signals.current_url.clone());

        if signals.passed_checks() >= self.confirm_threshold && !signals.challenge_visible {
            self.state = GateState::TargetConfirmed;
        } else if self.elapsed >= self.ceiling {
            self.state = GateState::TimedOut;
        }
        self.state
    }

    /// Operator override: accept the current page as the target.
    pub fn force_confirm(&mut self) {
        self.state = GateState::TargetConfirmed;
    }
}

/// Yes/no questions put to the human operator at decision points the
/// harness cannot resolve on its own.
pub trait OperatorPrompt: Send + Sync {
    /// Returns true if the operator wants to continue.
    fn confirm(&self, question: &str) -> bool;
}

/// Interactive prompt on the controlling terminal.
pub struct StdinPrompt;

impl OperatorPrompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        print!("{question} (y/n): ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// How the gate was resolved.
#[derive(Debug, Clone, Copy)]
pub struct GateOutcome {
    pub state: GateState,
    /// Number of poll cycles spent waiting. Zero when the first snapshot
    /// already cleared the gate.
    pub poll_cycles: u32,
    /// True when the operator forced continuation past an unresolved gate.
    pub forced_by_operator: bool,
}

/// Wait until the verification gate is resolved and the target page settles.
///
/// The cancellation token fires on operator interrupt (Ctrl-C); the operator
/// then chooses between forcing continuation and aborting the session.
pub async fn wait_for_target<S>(
    surface: &S,
    prompt: &dyn OperatorPrompt,
    cancel: &CancellationToken,
    settings: &GateSettings,
) -> Result<GateOutcome>
where
    S: VocabSurface + ?Sized,
{
    let mut machine = GateMachine::new(settings.ceiling, settings.confirm_threshold);

    let first = surface.gate_signals().await?;
    let mut outcome = GateOutcome {
        state: machine.observe(&first),
        poll_cycles: 0,
        forced_by_operator: false,
    };

    if outcome.state == GateState::TargetConfirmed {
        if first.target_markers_present {
            info!("already on the target page; no verification wait needed");
        } else {
            info!("no challenge markers found; treating the gate as passed");
        }
        return Ok(outcome);
    }

    info!(
        ceiling_secs = settings.ceiling.as_secs(),
        "verification challenge detected; waiting for it to resolve"
    );

    while machine.state() == GateState::ChallengeDetected {
        tokio::select! {
            _ = cancel.cancelled() => {
                warn!("interrupt received during verification wait");
                if prompt.confirm("Interrupted while waiting for verification. Continue anyway?") {
                    machine.force_confirm();
                    outcome.forced_by_operator = true;
                } else {
                    return Err(GaugeError::Aborted(
                        "operator declined to continue after interrupt".to_string(),
                    ));
                }
            }
            _ = sleep(settings.poll_interval) => {
                outcome.poll_cycles += 1;
                match surface.gate_signals().await {
                    Ok(signals) => {
                        let state = machine.tick(&signals, settings.poll_interval);
                        info!(
                            passed = signals.passed_checks(),
                            needed = settings.confirm_threshold,
                            elapsed_secs = machine.elapsed().as_secs(),
                            ?state,
                            "verification poll"
                        );
                    }
                    Err(err) => {
                        warn!(error = %err, "gate signal collection failed; retrying next cycle");
                    }
                }
            }
        }
    }

    if machine.state() == GateState::TimedOut {
        warn!(
            waited_secs = machine.elapsed().as_secs(),
            "verification wait ceiling exceeded"
        );
        // One fresh look at the URL: a late redirect may have landed on the
        // target path after the last poll.
        let on_path = match surface.gate_signals().await {
            Ok(signals) => signals.on_target_path,
            Err(err) => {
                warn!(error = %err, "post-timeout recheck failed");
                false
            }
        };
        if on_path {
            info!("target path matched after the ceiling; accepting");
            machine.force_confirm();
        } else if prompt.confirm("Verification wait timed out. Force continuation?") {
            machine.force_confirm();
            outcome.forced_by_operator = true;
        } else {
            return Err(GaugeError::GateTimeout);
        }
    }

    sleep(POST_GATE_SETTLE).await;
    match surface.settle_ready(READY_CHECK_BUDGET).await {
        Ok(true) => debug!("page reported ready after verification"),
        Ok(false) => warn!("page readiness check did not complete; continuing"),
        Err(err) => warn!(error = %err, "page readiness check failed; continuing"),
    }

    outcome.state = machine.state();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GateSettings {
        GateSettings::default()
    }

    fn challenge_signals() -> GateSignals {
        GateSignals {
            challenge_present: true,
            challenge_visible: true,
            current_url: "https://example.com/".to_string(),
            ..GateSignals::default()
        }
    }

    #[test]
    fn unrecognized_page_fails_open() {
        let mut machine = GateMachine::new(settings().ceiling, settings().confirm_threshold);
        let state = machine.observe(&GateSignals::default());
        assert_eq!(state, GateState::TargetConfirmed);
    }

    #[test]
    fn challenge_markers_put_the_machine_in_front_of_the_gate() {
        let mut machine = GateMachine::new(settings().ceiling, settings().confirm_threshold);
        assert_eq!(
            machine.observe(&challenge_signals()),
            GateState::ChallengeDetected
        );
    }

    #[test]
    fn quorum_confirms_only_once_challenge_is_no_longer_visible() {
        let mut machine = GateMachine::new(settings().ceiling, 2);
        machine.observe(&challenge_signals());

        // Two checks pass but the challenge element is still displayed.
        let mut signals = challenge_signals();
        signals.title_clear = true;
        signals.on_target_path = true;
        assert_eq!(
            machine.tick(&signals, Duration::from_secs(3)),
            GateState::ChallengeDetected
        );

        signals.challenge_visible = false;
        assert_eq!(
            machine.tick(&signals, Duration::from_secs(3)),
            GateState::TargetConfirmed
        );
    }

    #[test]
    fn below_quorum_never_confirms() {
        let mut machine = GateMachine::new(settings().ceiling, 2);
        machine.observe(&challenge_signals());

        let mut signals = challenge_signals();
        signals.challenge_visible = false;
        signals.title_clear = true;
        assert_eq!(
            machine.tick(&signals, Duration::from_secs(3)),
            GateState::ChallengeDetected
        );
    }

    #[test]
    fn ceiling_produces_timeout() {
        let mut machine = GateMachine::new(Duration::from_secs(9), 2);
        machine.observe(&challenge_signals());

        let signals = challenge_signals();
        machine.tick(&signals, Duration::from_secs(3));
        machine.tick(&signals, Duration::from_secs(3));
        assert_eq!(
            machine.tick(&signals, Duration::from_secs(3)),
            GateState::TimedOut
        );
    }

    #[test]
    fn force_confirm_overrides_timeout() {
        let mut machine = GateMachine::new(Duration::from_secs(3), 2);
        machine.observe(&challenge_signals());
        machine.tick(&challenge_signals(), Duration::from_secs(3));
        assert_eq!(machine.state(), GateState::TimedOut);

        machine.force_confirm();
        assert_eq!(machine.state(), GateState::TargetConfirmed);
    }
}
