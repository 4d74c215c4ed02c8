use std::time::Duration;
use rand::Rng;
use log::debug;

/// Inclusive range a randomized pause is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn from_secs(min: u64, max: u64) -> Self {
        DelayRange {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    pub const fn zero() -> Self {
        DelayRange {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Picks a duration uniformly in `[min, max]`. A reversed range collapses to `min`.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let mut rng = rand::thread_rng();
        let millis = rng.gen_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(millis as u64)
    }
}

pub async fn pause(duration: Duration, label: &str) {
    if duration.is_zero() {
        return;
    }
    debug!("Waiting for {:.1} seconds ({})...", duration.as_secs_f64(), label);
    tokio::time::sleep(duration).await;
}

pub async fn random_pause(range: DelayRange, label: &str) {
    pause(range.sample(), label).await;
}
