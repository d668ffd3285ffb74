use crate::{HookResult, Outcome, RampProfile};
use std::fmt;
use std::time::Duration;

/// Statistics for a completed plan.
///
/// Everything here is computed from the steady phase only; ramp phases contribute nothing but
/// the [`RampProfile`].
#[derive(Debug)]
pub struct Report {
    pub name: String,
    /// Sum of all measured `execute` durations.
    pub test_duration: Duration,
    pub request_count: usize,
    pub error_count: usize,
    /// `error_count / request_count`, in `[0, 1]`.
    pub error_rate: f64,
    /// Requests per second of summed execute time, `request_count / test_duration`.
    ///
    /// NOTE: This is not the observed wall-clock rate. Use the plan's rate and duration for that.
    pub throughput: f64,
    pub p50: Duration,
    pub p90: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub mean: Duration,
    pub std_dev: Duration,
    pub ramping: RampProfile,
    /// Measured outcomes, sorted by duration.
    pub outcomes: Vec<Outcome>,
    /// Result of the `assert` hook, if one was supplied.
    pub assertion: Option<HookResult>,
    /// Result of the `formalize` hook, if one was supplied.
    pub formalization: Option<HookResult>,
}

impl Report {
    /// `false` only when an `assert` hook ran and returned an error.
    pub fn passed(&self) -> bool {
        !matches!(self.assertion, Some(Err(_)))
    }

    /// Value returned by a successful `assert` hook, downcast to `T`.
    pub fn assertion_value<T: 'static>(&self) -> Option<&T> {
        match &self.assertion {
            Some(Ok(value)) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use humantime::format_duration as human;

        writeln!(f, "\n{:>37}\n", "-- Summary --")?;
        writeln!(f, "{:>30}: {}", "Test name", self.name)?;
        writeln!(f, "{:>30}: {}", "Test duration", human(self.test_duration))?;
        writeln!(f, "{:>30}: {}", "Request count", self.request_count)?;
        writeln!(f, "{:>30}: {}", "Error count", self.error_count)?;
        writeln!(f, "{:>30}: {:.2}", "Error rate (%)", self.error_rate * 100.)?;
        writeln!(f, "{:>30}: {:.2}", "Throughput (req/s)", self.throughput)?;
        writeln!(f, "{:>30}: {}", "P50", human(self.p50))?;
        writeln!(f, "{:>30}: {}", "P90", human(self.p90))?;
        writeln!(f, "{:>30}: {}", "P95", human(self.p95))?;
        writeln!(f, "{:>30}: {}", "P99", human(self.p99))?;
        writeln!(f, "{:>30}: {}", "Avg", human(self.mean))?;
        writeln!(f, "{:>30}: {}", "Std", human(self.std_dev))
    }
}
