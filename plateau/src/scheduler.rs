mod pacer;

use crate::collector::OutcomeSink;
use crate::diagnostics::Diagnostics;
use crate::trial::Trial;
use pacer::Pacer;
use plateau_core::{PlanConfig, RampProfile, TICK_INTERVAL};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    RampUp,
    Steady,
    RampDown,
    Done,
}

impl Phase {
    fn next(self) -> Self {
        match self {
            Phase::RampUp => Phase::Steady,
            Phase::Steady => Phase::RampDown,
            Phase::RampDown | Phase::Done => Phase::Done,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::RampUp => "Rampup",
            Phase::Steady => "Testing",
            Phase::RampDown => "Rampdown",
            Phase::Done => "Done",
        };
        f.write_str(label)
    }
}

/// Trials to launch on each ramp-up tick.
///
/// Starts at level 1 and climbs by [`PlanConfig::ramp_step`] while the level does not exceed the
/// target rate. Empty when ramping is disabled.
pub(crate) fn ramp_up_levels(config: &PlanConfig) -> Vec<u32> {
    let mut levels = vec![];
    if !config.is_ramping() {
        return levels;
    }

    let target = config.requests_per_second as f64;
    let step = config.ramp_step();
    let mut level = 1.;
    while level <= target {
        levels.push(level.floor() as u32);
        level += step;
    }
    levels
}

/// Trials to launch on each ramp-down tick, from the target rate down to no less than one.
pub(crate) fn ramp_down_levels(config: &PlanConfig) -> Vec<u32> {
    let mut levels = vec![];
    if !config.is_ramping() {
        return levels;
    }

    let step = config.ramp_step();
    let mut level = config.requests_per_second as f64;
    while level >= 1. {
        levels.push(level.floor() as u32);
        level -= step;
    }
    levels
}

/// Drives the ramp-up, steady and ramp-down phases.
///
/// Every trial is spawned onto one [`JoinSet`], which doubles as the completion barrier: the
/// scheduler does not return until every trial of every phase has finished. Finished tasks are
/// reaped on each tick.
pub(crate) struct Scheduler<I, O> {
    config: PlanConfig,
    trial: Trial<I, O>,
    diagnostics: Arc<dyn Diagnostics>,
    pacer: Pacer,
    tasks: JoinSet<()>,
}

impl<I, O> Scheduler<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// `config` is expected to already be normalized.
    pub fn new(config: PlanConfig, trial: Trial<I, O>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            config,
            trial,
            diagnostics,
            pacer: Pacer::new(TICK_INTERVAL),
            tasks: JoinSet::new(),
        }
    }

    pub async fn run(mut self, sink: OutcomeSink) -> RampProfile {
        debug!("Pacing ticks every {}", self.pacer);

        let mut profile = RampProfile {
            name: self.config.name.clone(),
            ramping: self.config.ramping,
            ..Default::default()
        };

        let mut phase = Phase::RampUp;
        loop {
            match phase {
                Phase::RampUp => {
                    profile.ramp_up = self.ramp(phase, ramp_up_levels(&self.config)).await;
                }
                Phase::Steady => self.steady(&sink).await,
                Phase::RampDown => {
                    profile.ramp_down = self.ramp(phase, ramp_down_levels(&self.config)).await;
                }
                Phase::Done => break,
            }
            phase = phase.next();
        }

        drop(sink);
        self.wait_for_completion().await;

        profile
    }

    async fn ramp(&mut self, phase: Phase, levels: Vec<u32>) -> Vec<u32> {
        if levels.is_empty() {
            return levels;
        }

        info!("{phase} over {} ticks", levels.len());
        let target = self.config.requests_per_second as f64;
        for &level in &levels {
            let since = self.pacer.tick().await;
            self.reap_finished();
            self.launch(level, None);
            debug!("{phase}: launched {level} trials, {since:?} after the previous tick");
            self.progress(phase, level as f64 / target * 100.);
        }
        self.diagnostics
            .log(&format!("{} - {phase} done", self.config.name));

        levels
    }

    async fn steady(&mut self, sink: &OutcomeSink) {
        let ticks = self.config.steady_ticks();
        let rps = self.config.requests_per_second;
        info!("Testing at {rps} trials per tick over {ticks} ticks");

        for tick in 0..ticks {
            let since = self.pacer.tick().await;
            self.reap_finished();
            self.launch(rps, Some(sink));
            debug!(
                "Steady tick {}/{ticks}: launched {rps} trials, {since:?} after the previous tick",
                tick + 1
            );
            self.progress(Phase::Steady, (tick + 1) as f64 / ticks as f64 * 100.);
        }
        self.diagnostics
            .log(&format!("{} - Test done", self.config.name));
    }

    /// Fire-and-forget `count` trials. Outcomes only reach the collector when a sink is given.
    fn launch(&mut self, count: u32, sink: Option<&OutcomeSink>) {
        for _ in 0..count {
            let trial = self.trial.clone();
            match sink {
                Some(sink) => {
                    let sink = sink.clone();
                    self.tasks.spawn(async move {
                        sink.record(trial.run().await);
                    });
                }
                None => {
                    self.tasks.spawn(async move {
                        if let Some(err) = trial.run().await.error {
                            trace!("Ramp trial failed: {err}");
                        }
                    });
                }
            }
        }
    }

    fn progress(&self, phase: Phase, percent: f64) {
        self.diagnostics.log(&format!(
            "{} - {phase} at {percent:.0}%",
            self.config.name
        ));
    }

    /// Release finished trial tasks without waiting on running ones.
    fn reap_finished(&mut self) {
        while let Some(res) = self.tasks.try_join_next() {
            if let Err(err) = res {
                error!("Trial task did not complete: {err}");
            }
        }
    }

    async fn wait_for_completion(&mut self) {
        debug!("Waiting on {} trials", self.tasks.len());
        while let Some(res) = self.tasks.join_next().await {
            if let Err(err) = res {
                error!("Trial task did not complete: {err}");
            }
        }
    }
}
