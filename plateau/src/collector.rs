use metrics_util::AtomicBucket;
use plateau_core::{Outcome, TrialLabels};
use std::sync::{Arc, Weak};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Sink for steady-phase outcomes.
///
/// Writers get [`OutcomeSink`] handles which only hold a weak reference to the underlying
/// bucket. [`Collector::close`] consumes the collector, so once it has been drained any later
/// write finds the bucket gone and is rejected.
pub(crate) struct Collector {
    bucket: Arc<AtomicBucket<Outcome>>,
    labels: Arc<TrialLabels>,
    capacity_hint: usize,
}

impl Collector {
    pub fn new(capacity_hint: usize, labels: TrialLabels) -> Self {
        #[cfg(feature = "metrics")]
        metrics::describe_histogram!(
            labels.latency.clone(),
            metrics::Unit::Nanoseconds,
            "Execute latency of measured trials"
        );

        Self {
            bucket: Arc::new(AtomicBucket::new()),
            labels: Arc::new(labels),
            capacity_hint,
        }
    }

    pub fn sink(&self) -> OutcomeSink {
        OutcomeSink {
            bucket: Arc::downgrade(&self.bucket),
            labels: self.labels.clone(),
        }
    }

    /// Stop accepting outcomes and return everything collected, in completion order.
    ///
    /// NOTE: Must only be called once every writer has been joined.
    pub fn close(self) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(self.capacity_hint);

        match Arc::try_unwrap(self.bucket) {
            Ok(bucket) => bucket.clear_with(|block| outcomes.extend_from_slice(block)),
            Err(bucket) => {
                error!("Collector closed while a write was in flight. Late outcomes are lost.");
                bucket.clear_with(|block| outcomes.extend_from_slice(block));
            }
        }

        if outcomes.len() != self.capacity_hint {
            debug!(
                "Collected {} outcomes, expected {}",
                outcomes.len(),
                self.capacity_hint
            );
        }

        outcomes
    }
}

#[derive(Clone)]
pub(crate) struct OutcomeSink {
    bucket: Weak<AtomicBucket<Outcome>>,
    #[allow(unused)]
    labels: Arc<TrialLabels>,
}

impl OutcomeSink {
    pub fn record(&self, outcome: Outcome) {
        #[cfg(feature = "metrics")]
        {
            metrics::histogram!(self.labels.latency.clone())
                .record(outcome.duration.as_nanos() as f64);
            if outcome.is_err() {
                metrics::counter!(self.labels.error.clone()).increment(1);
            } else {
                metrics::counter!(self.labels.success.clone()).increment(1);
            }
        }

        match self.bucket.upgrade() {
            Some(bucket) => bucket.push(outcome),
            None => error!("Outcome recorded after the collector was closed; dropping it."),
        }
    }
}
