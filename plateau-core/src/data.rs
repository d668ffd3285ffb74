use crate::TrialError;
use std::fmt;
use std::time::Duration;

/// Recorded result of one measured trial.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// Wall-clock time spent in `execute`.
    pub duration: Duration,
    pub error: Option<TrialError>,
}

impl Outcome {
    pub fn success(duration: Duration) -> Self {
        Self {
            duration,
            error: None,
        }
    }

    pub fn failure(duration: Duration, error: TrialError) -> Self {
        Self {
            duration,
            error: Some(error),
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// Trials launched per tick while ramping up and down. Diagnostic only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RampProfile {
    pub name: String,
    pub ramping: Duration,
    pub ramp_up: Vec<u32>,
    pub ramp_down: Vec<u32>,
}

impl RampProfile {
    pub fn launched(&self) -> u64 {
        self.ramp_up
            .iter()
            .chain(self.ramp_down.iter())
            .map(|&n| n as u64)
            .sum()
    }
}

impl fmt::Display for RampProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{:>37}\n", "-- Ramping --")?;
        writeln!(f, "{:>30}: {}", "Test name", self.name)?;
        writeln!(
            f,
            "{:>30}: {}",
            "Ramping",
            humantime::format_duration(self.ramping)
        )?;
        writeln!(f, "{:>30}: {:?}", "Ramp-up req/s", self.ramp_up)?;
        writeln!(f, "{:>30}: {:?}", "Ramp-down req/s", self.ramp_down)
    }
}
