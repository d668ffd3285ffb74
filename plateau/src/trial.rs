use futures::FutureExt;
use plateau_core::{trial_error, Outcome, TrialError};
use std::any::Any;
use std::error::Error;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

pub(crate) type SetupFn<I> = Arc<dyn Fn() -> BoxFuture<Result<I, TrialError>> + Send + Sync>;
pub(crate) type ExecuteFn<I, O> =
    Arc<dyn Fn(Result<I, TrialError>) -> BoxFuture<Result<O, TrialError>> + Send + Sync>;
pub(crate) type CleanupFn<O> =
    Arc<dyn Fn(Result<O, TrialError>) -> BoxFuture<Result<(), TrialError>> + Send + Sync>;

pub(crate) fn setup_fn<T, F, I, E>(func: T) -> SetupFn<I>
where
    T: Fn() -> F + Send + Sync + 'static,
    F: Future<Output = Result<I, E>> + Send + 'static,
    E: Into<Box<dyn Error + Send + Sync + 'static>>,
{
    Arc::new(move || {
        let fut = func();
        Box::pin(async move { fut.await.map_err(trial_error) })
    })
}

pub(crate) fn execute_fn<T, F, I, O, E>(func: T) -> ExecuteFn<I, O>
where
    T: Fn(Result<I, TrialError>) -> F + Send + Sync + 'static,
    F: Future<Output = Result<O, E>> + Send + 'static,
    E: Into<Box<dyn Error + Send + Sync + 'static>>,
{
    Arc::new(move |input| {
        let fut = func(input);
        Box::pin(async move { fut.await.map_err(trial_error) })
    })
}

pub(crate) fn cleanup_fn<T, F, O, E>(func: T) -> CleanupFn<O>
where
    T: Fn(Result<O, TrialError>) -> F + Send + Sync + 'static,
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<Box<dyn Error + Send + Sync + 'static>>,
{
    Arc::new(move |output| {
        let fut = func(output);
        Box::pin(async move { fut.await.map_err(trial_error) })
    })
}

/// One unit of work: setup, execute, cleanup.
///
/// All three callbacks run for every trial, in order, whatever the previous step returned.
/// Upstream failures are handed to the next callback rather than short-circuiting it, so a
/// cleanup always gets a chance to release what setup acquired.
pub(crate) struct Trial<I, O> {
    setup: SetupFn<I>,
    execute: ExecuteFn<I, O>,
    cleanup: CleanupFn<O>,
}

impl<I, O> Clone for Trial<I, O> {
    fn clone(&self) -> Self {
        Self {
            setup: self.setup.clone(),
            execute: self.execute.clone(),
            cleanup: self.cleanup.clone(),
        }
    }
}

impl<I, O> Trial<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new(setup: SetupFn<I>, execute: ExecuteFn<I, O>, cleanup: CleanupFn<O>) -> Self {
        Self {
            setup,
            execute,
            cleanup,
        }
    }

    /// Run the pipeline once. Only the `execute` call is timed.
    ///
    /// A panicking callback is caught and treated as that step failing, so every run yields an
    /// outcome.
    pub async fn run(&self) -> Outcome {
        let input = guarded("setup", async { (self.setup)().await }).await;

        let start = Instant::now();
        let output = guarded("execute", async { (self.execute)(input).await }).await;
        let duration = start.elapsed();

        let error = output.as_ref().err().cloned();

        if let Err(err) = guarded("cleanup", async { (self.cleanup)(output).await }).await {
            trace!("Cleanup failed: {err}");
        }

        Outcome { duration, error }
    }
}

async fn guarded<T, F>(step: &str, fut: F) -> Result<T, TrialError>
where
    F: Future<Output = Result<T, TrialError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => {
            let msg = panic_message(panic.as_ref());
            debug!("Trial {step} panicked: {msg}");
            Err(trial_error(format!("{step} panicked: {msg}")))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
