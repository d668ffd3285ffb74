//! Reduce measured outcomes to a [`Report`].
use plateau_core::{ConfigError, Outcome, RampProfile, Report};
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Summarize the steady-phase outcomes of a run.
///
/// Outcomes are sorted by duration; percentiles use the nearest-rank method without
/// interpolation. Fails with [`ConfigError::NoOutcomes`] when there is nothing to summarize.
///
/// # Example
/// ```
/// use plateau::summary::summarize;
/// use plateau::core::{Outcome, RampProfile};
/// use std::time::Duration;
///
/// let outcomes = (1..=10)
///     .map(|ms| Outcome::success(Duration::from_millis(ms)))
///     .collect();
/// let report = summarize(outcomes, RampProfile::default()).unwrap();
///
/// assert_eq!(report.p50, Duration::from_millis(6));
/// assert_eq!(report.p99, Duration::from_millis(10));
/// ```
pub fn summarize(mut outcomes: Vec<Outcome>, ramping: RampProfile) -> Result<Report, ConfigError> {
    if outcomes.is_empty() {
        return Err(ConfigError::NoOutcomes);
    }

    outcomes.sort_unstable_by_key(|o| o.duration);

    let request_count = outcomes.len();
    let secs: Vec<f64> = outcomes.iter().map(|o| o.duration.as_secs_f64()).collect();
    let test_duration: Duration = outcomes.iter().map(|o| o.duration).sum();

    let mean = statistical::mean(&secs);
    // Sample deviation; a single outcome has none.
    let std_dev = if request_count > 1 {
        statistical::standard_deviation(&secs, Some(mean))
    } else {
        0.
    };

    let throughput = if test_duration.is_zero() {
        warn!("Measured trials took no time; reporting zero throughput.");
        0.
    } else {
        request_count as f64 / test_duration.as_secs_f64()
    };

    let error_count = outcomes.iter().filter(|o| o.is_err()).count();
    let error_rate = error_count as f64 / request_count as f64;

    debug!("Summarized {request_count} outcomes with {error_count} errors");

    Ok(Report {
        name: ramping.name.clone(),
        test_duration,
        request_count,
        error_count,
        error_rate,
        throughput,
        p50: nearest_rank(&outcomes, 50),
        p90: nearest_rank(&outcomes, 90),
        p95: nearest_rank(&outcomes, 95),
        p99: nearest_rank(&outcomes, 99),
        mean: from_secs(mean),
        std_dev: from_secs(std_dev),
        ramping,
        outcomes,
        assertion: None,
        formalization: None,
    })
}

/// Duration at index `floor(n * p / 100)`, clamped to the last outcome.
///
/// NOTE: `sorted` must be non-empty.
fn nearest_rank(sorted: &[Outcome], percentile: u32) -> Duration {
    let idx = (sorted.len() * percentile as usize / 100).min(sorted.len() - 1);
    sorted[idx].duration
}

fn from_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_else(|err| {
        error!("Invalid statistic {secs}: {err}");
        Duration::ZERO
    })
}
