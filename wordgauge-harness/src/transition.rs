//! Round-to-round advancement.

use crate::surface::VocabSurface;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait after continuing into another word round.
const NEXT_ROUND_WAIT: Duration = Duration::from_secs(3);

/// Wait after the final continue, while the results view renders.
const FINAL_RESULT_WAIT: Duration = Duration::from_secs(5);

/// Click the continue control and pause for the next view to render.
/// Returns whether the page actually advanced; a missing or unclickable
/// control ends the round sequence rather than the session.
pub async fn advance<S>(surface: &S, final_round: bool) -> bool
where
    S: VocabSurface + ?Sized,
{
    let clicked = match surface.click_continue().await {
        Ok(clicked) => clicked,
        Err(err) => {
            warn!(error = %err, "continue click failed");
            false
        }
    };
    if !clicked {
        warn!("continue control not found; cannot advance");
        return false;
    }

    if final_round {
        info!("final round submitted; waiting for the results view");
        sleep(FINAL_RESULT_WAIT).await;
    } else {
        sleep(NEXT_ROUND_WAIT).await;
    }
    true
}
