use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
/// Produces human-like delays between page interactions.
pub struct Pacing;

impl Pacing {
    pub fn new() -> Self {
        Self
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    pub async fn random_delay(&self, min: u64, max: u64) {
        let mut rng = OsRng;
        let ms = rng.gen_range(min..=max);
        sleep(Duration::from_millis(ms)).await;
    }

    /// Fixed settle pause, used before interacting with a freshly scrolled
    /// element.
    pub async fn settle(&self, duration: Duration) {
        sleep(duration).await;
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new()
    }
}
