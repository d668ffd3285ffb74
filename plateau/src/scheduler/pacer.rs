use std::time::Duration;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

/// Fixed-rate tick source for the phase loop.
///
/// The first tick completes immediately. Each later tick completes one period after the
/// previous one, or right away if launching took longer than a period.
pub(crate) struct Pacer {
    interval: Interval,
    last_tick: Option<Instant>,
    period: Duration,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            last_tick: None,
            period,
        }
    }

    /// Wait for the next tick and return the time since the previous one.
    pub async fn tick(&mut self) -> Duration {
        let next = self.interval.tick().await;
        let elapsed = self
            .last_tick
            .map(|last| next.duration_since(last))
            .unwrap_or_default();
        self.last_tick = Some(next);
        elapsed
    }
}

impl std::fmt::Display for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", humantime::format_duration(self.period))
    }
}
