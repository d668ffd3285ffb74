use std::time::Duration;

/// Length of one scheduling tick. Every phase launches its trials once per tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// The lowest steady-state rate a plan is coerced to.
pub const MIN_REQUESTS_PER_SECOND: u32 = 1;

/// The shortest measured phase a plan is coerced to.
pub const MIN_STEADY_DURATION: Duration = Duration::from_secs(1);
