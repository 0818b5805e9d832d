//! End-to-end session orchestration: gate, rounds, transitions, extraction.

use crate::gate::{wait_for_target, GateSettings, OperatorPrompt};
use crate::rounds::run_round;
use crate::surface::VocabSurface;
use crate::transition::advance;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wordgauge_common::records::SessionResult;
use wordgauge_common::{GaugeError, Result};

/// What a session should do once the gate is behind it.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Click budget per round; the length is the number of rounds.
    pub click_counts: Vec<usize>,
    pub gate: GateSettings,
}

impl Default for SessionPlan {
    fn default() -> Self {
        Self {
            click_counts: vec![5, 5],
            gate: GateSettings::default(),
        }
    }
}

/// Run one full session against an already-navigated surface.
///
/// Gate failures abort with an error; page-level trouble after the gate
/// degrades to a partial [`SessionResult`] so the completed prefix of
/// rounds is never lost. An operator interrupt is honored at every
/// suspension point and aborts the session so the caller's teardown path
/// runs.
pub async fn run_session<S>(
    surface: &S,
    prompt: &dyn OperatorPrompt,
    cancel: &CancellationToken,
    plan: &SessionPlan,
) -> Result<SessionResult>
where
    S: VocabSurface + ?Sized,
{
    let gate = wait_for_target(surface, prompt, cancel, &plan.gate).await?;
    info!(
        poll_cycles = gate.poll_cycles,
        forced = gate.forced_by_operator,
        "verification gate resolved"
    );

    let mut rng = StdRng::from_entropy();
    let mut result = SessionResult::default();
    let total_rounds = plan.click_counts.len();

    for (i, &requested) in plan.click_counts.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(GaugeError::Aborted(
                "operator interrupt before the next round".to_string(),
            ));
        }

        let round_no = (i + 1) as u32;
        let record = tokio::select! {
            _ = cancel.cancelled() => {
                warn!(round = round_no, "operator interrupt during a word round");
                return Err(GaugeError::Aborted(
                    "operator interrupt during a word round".to_string(),
                ));
            }
            record = run_round(surface, &mut rng, round_no, requested) => record,
        };
        result.push_round(record);

        let final_round = i + 1 == total_rounds;
        let advanced = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(GaugeError::Aborted(
                    "operator interrupt during a round transition".to_string(),
                ));
            }
            advanced = advance(surface, final_round) => advanced,
        };
        if !advanced {
            if final_round {
                warn!("results view not reached; skipping final extraction");
            } else {
                warn!(
                    completed = round_no,
                    planned = total_rounds,
                    "round sequence cut short"
                );
            }
            return Ok(result);
        }

        if final_round {
            match surface.read_final_size().await {
                Ok(Some(size)) => {
                    info!(vocab_size = %size, "final vocabulary size extracted");
                    result.final_vocab_size = Some(size);
                }
                Ok(None) => warn!("results view rendered without a readable figure"),
                Err(err) => warn!(error = %err, "final size extraction failed"),
            }
        }
    }

    Ok(result)
}
