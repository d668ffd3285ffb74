use crate::{MIN_REQUESTS_PER_SECOND, MIN_STEADY_DURATION};
use std::time::Duration;

/// Rate and timing parameters of a plan.
///
/// Values are taken as given by the caller; [`PlanConfig::normalized`] applies the defaults a
/// run actually uses.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanConfig {
    pub name: String,
    /// Trials launched per tick during the steady phase.
    pub requests_per_second: u32,
    /// Length of each of the ramp-up and ramp-down phases. Zero disables both.
    pub ramping: Duration,
    /// Length of the measured (steady) phase.
    pub duration: Duration,
}

impl PlanConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            requests_per_second: 0,
            ramping: Duration::ZERO,
            duration: Duration::ZERO,
        }
    }

    /// Coerce the rate to at least one trial per tick and the steady phase to at least one
    /// second.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.clone(),
            requests_per_second: self.requests_per_second.max(MIN_REQUESTS_PER_SECOND),
            ramping: self.ramping,
            duration: self.duration.max(MIN_STEADY_DURATION),
        }
    }

    pub fn is_ramping(&self) -> bool {
        !self.ramping.is_zero()
    }

    /// Number of ticks in the steady phase, `ceil(duration)`.
    pub fn steady_ticks(&self) -> u64 {
        self.duration.as_secs_f64().ceil() as u64
    }

    /// Per-tick change of the ramp level.
    ///
    /// Sub-second ramps are treated as one second so the step never exceeds the target rate.
    pub fn ramp_step(&self) -> f64 {
        self.requests_per_second as f64 / self.ramping.as_secs_f64().max(1.)
    }

    /// Expected number of measured outcomes.
    pub fn capacity_hint(&self) -> usize {
        self.steady_ticks() as usize * self.requests_per_second as usize
    }
}
