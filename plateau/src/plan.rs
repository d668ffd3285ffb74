//! Load test plan and run coordination
use crate::collector::Collector;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::hooks::{assert_fn, formalize_fn, Hooks};
use crate::scheduler::Scheduler;
use crate::summary::summarize;
use crate::trial::{cleanup_fn, execute_fn, setup_fn, CleanupFn, ExecuteFn, SetupFn, Trial};
use plateau_core::{ConfigError, PlanConfig, Report, TrialError, TrialLabels};
use std::any::Any;
use std::error::Error;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Load test plan
///
/// A plan drives a trial (`setup` → `execute` → `cleanup`) through three phases:
///
/// 1. **Ramp-up**: the number of trials launched per second climbs linearly from one to the
///    target rate over the ramping duration. Outcomes are discarded.
/// 2. **Steady**: the target rate is held for the configured duration. Every outcome is measured.
/// 3. **Ramp-down**: the mirror of ramp-up. Outcomes are discarded.
///
/// Trials are launched without waiting on earlier ones; the run only completes once every trial
/// of every phase has finished. The measured outcomes are then summarized into a [`Report`] and
/// handed to the optional `assert` and `formalize` hooks.
///
/// # Example
/// ```no_run
/// use plateau::prelude::*;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let report = Plan::new("work")
///         .rps(10)
///         .ramping(Duration::from_secs(10))
///         .duration(Duration::from_secs(30))
///         .setup(|| async { Ok::<_, TrialError>("http://localhost:3000/work") })
///         .execute(|url: Result<&'static str, TrialError>| async move {
///             let _url = url?;
///             // Call the system under test here.
///             Ok::<_, TrialError>(())
///         })
///         .cleanup(|_| async { Ok::<_, TrialError>(()) })
///         .assert(|report: &Report| {
///             if report.p95 > Duration::from_millis(375) {
///                 Err(format!("P95 too slow: {:?}", report.p95))
///             } else {
///                 Ok(report.p95)
///             }
///         })
///         .await
///         .unwrap();
///
///     println!("{report}");
/// }
/// ```
pub struct Plan<I, O> {
    config: PlanConfig,
    setup: Option<SetupFn<I>>,
    execute: Option<ExecuteFn<I, O>>,
    cleanup: Option<CleanupFn<O>>,
    hooks: Hooks,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<I, O> Plan<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new(name: &str) -> Self {
        Self {
            config: PlanConfig::new(name),
            setup: None,
            execute: None,
            cleanup: None,
            hooks: Hooks::default(),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Produce the input of a trial.
    pub fn setup<T, F, E>(mut self, func: T) -> Self
    where
        T: Fn() -> F + Send + Sync + 'static,
        F: Future<Output = Result<I, E>> + Send + 'static,
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        self.setup = Some(setup_fn(func));
        self
    }

    /// Run a trial against the system under test. Receives whatever `setup` returned, including
    /// its error. Only this call is timed.
    pub fn execute<T, F, E>(mut self, func: T) -> Self
    where
        T: Fn(Result<I, TrialError>) -> F + Send + Sync + 'static,
        F: Future<Output = Result<O, E>> + Send + 'static,
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        self.execute = Some(execute_fn(func));
        self
    }

    /// Release whatever `execute` returned. Called even when `execute` failed.
    pub fn cleanup<T, F, E>(mut self, func: T) -> Self
    where
        T: Fn(Result<O, TrialError>) -> F + Send + Sync + 'static,
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        self.cleanup = Some(cleanup_fn(func));
        self
    }

    /// Trials launched per second during the steady phase. Values below one are raised to one.
    pub fn rps(mut self, requests_per_second: u32) -> Self {
        self.config.requests_per_second = requests_per_second;
        self
    }

    /// Length of the ramp-up and ramp-down phases. Zero (the default) skips both.
    pub fn ramping(mut self, ramping: Duration) -> Self {
        self.config.ramping = ramping;
        self
    }

    /// Length of the measured phase. Shorter than one second is raised to one second.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// KPI check run against the final report. Its result is recorded on
    /// [`Report::assertion`] and never fails the run.
    pub fn assert<T, V, E>(mut self, func: T) -> Self
    where
        T: Fn(&Report) -> Result<V, E> + Send + Sync + 'static,
        V: Any + Send + Sync,
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        self.hooks.assert = Some(assert_fn(func));
        self
    }

    /// Post-processing step (publishing results, say) run after `assert`. Its result is
    /// recorded on [`Report::formalization`].
    pub fn formalize<T, F, V, E>(mut self, func: T) -> Self
    where
        T: Fn() -> F + Send + Sync + 'static,
        F: Future<Output = Result<V, E>> + Send + 'static,
        V: Any + Send + Sync,
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        self.hooks.formalize = Some(formalize_fn(func));
        self
    }

    /// Where progress lines go. Defaults to [`TracingDiagnostics`].
    pub fn diagnostics<D: Diagnostics + 'static>(mut self, diagnostics: D) -> Self {
        self.diagnostics = Arc::new(diagnostics);
        self
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Execute the plan.
    ///
    /// Fails without launching anything when a required callback is missing, and with
    /// [`ConfigError::NoOutcomes`] if the steady phase measured nothing.
    pub async fn run(self) -> Result<Report, ConfigError> {
        let Plan {
            config,
            setup,
            execute,
            cleanup,
            hooks,
            diagnostics,
        } = self;

        let trial = match assemble(setup, execute, cleanup) {
            Ok(trial) => trial,
            Err(err) => {
                diagnostics.abort(&err);
                return Err(err);
            }
        };

        run_plan(config.normalized(), trial, hooks, diagnostics).await
    }
}

impl<I, O> IntoFuture for Plan<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    type Output = Result<Report, ConfigError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.run())
    }
}

fn assemble<I, O>(
    setup: Option<SetupFn<I>>,
    execute: Option<ExecuteFn<I, O>>,
    cleanup: Option<CleanupFn<O>>,
) -> Result<Trial<I, O>, ConfigError>
where
    I: Send + 'static,
    O: Send + 'static,
{
    let setup = setup.ok_or(ConfigError::MissingCallback("setup"))?;
    let execute = execute.ok_or(ConfigError::MissingCallback("execute"))?;
    let cleanup = cleanup.ok_or(ConfigError::MissingCallback("cleanup"))?;
    Ok(Trial::new(setup, execute, cleanup))
}

#[instrument(name="plan", skip_all, fields(name=config.name))]
async fn run_plan<I, O>(
    config: PlanConfig,
    trial: Trial<I, O>,
    hooks: Hooks,
    diagnostics: Arc<dyn Diagnostics>,
) -> Result<Report, ConfigError>
where
    I: Send + 'static,
    O: Send + 'static,
{
    info!("Running {} with config {:?}", config.name, &config);

    let collector = Collector::new(config.capacity_hint(), TrialLabels::for_plan(&config.name));
    let scheduler = Scheduler::new(config, trial, diagnostics.clone());

    let ramping = scheduler.run(collector.sink()).await;
    let outcomes = collector.close();

    // A normalized config schedules at least one steady trial, and every trial yields an
    // outcome, so this only fails for configs that bypass `PlanConfig::normalized`.
    let mut report = match summarize(outcomes, ramping) {
        Ok(report) => report,
        Err(err) => {
            diagnostics.abort(&err);
            return Err(err);
        }
    };

    hooks.apply(&mut report).await;

    info!("Plan complete");
    Ok(report)
}
