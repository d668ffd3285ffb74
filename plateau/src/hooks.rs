use crate::trial::BoxFuture;
use plateau_core::{trial_error, HookResult, HookValue, Report};
use std::any::Any;
use std::error::Error;
use std::future::Future;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

pub(crate) type AssertFn = Box<dyn Fn(&Report) -> HookResult + Send + Sync>;
pub(crate) type FormalizeFn = Box<dyn Fn() -> BoxFuture<HookResult> + Send + Sync>;

pub(crate) fn assert_fn<T, V, E>(func: T) -> AssertFn
where
    T: Fn(&Report) -> Result<V, E> + Send + Sync + 'static,
    V: Any + Send + Sync,
    E: Into<Box<dyn Error + Send + Sync + 'static>>,
{
    Box::new(move |report| {
        func(report)
            .map(|value| Box::new(value) as HookValue)
            .map_err(trial_error)
    })
}

pub(crate) fn formalize_fn<T, F, V, E>(func: T) -> FormalizeFn
where
    T: Fn() -> F + Send + Sync + 'static,
    F: Future<Output = Result<V, E>> + Send + 'static,
    V: Any + Send + Sync,
    E: Into<Box<dyn Error + Send + Sync + 'static>>,
{
    Box::new(move || {
        let fut = func();
        Box::pin(async move {
            fut.await
                .map(|value| Box::new(value) as HookValue)
                .map_err(trial_error)
        })
    })
}

/// Optional caller hooks run once statistics are final.
#[derive(Default)]
pub(crate) struct Hooks {
    pub assert: Option<AssertFn>,
    pub formalize: Option<FormalizeFn>,
}

impl Hooks {
    /// Run `assert` then `formalize`, recording what each returned on the report.
    pub async fn apply(&self, report: &mut Report) {
        if let Some(assert) = &self.assert {
            let res = assert(report);
            if let Err(err) = &res {
                info!("Assertion failed: {err}");
            }
            report.assertion = Some(res);
        }

        if let Some(formalize) = &self.formalize {
            let res = formalize().await;
            if let Err(err) = &res {
                warn!("Formalize failed: {err}");
            }
            report.formalization = Some(res);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::summarize;
    use plateau_core::{Outcome, RampProfile, TrialError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn report() -> Report {
        let outcomes = (1..=20)
            .map(|ms| Outcome::success(Duration::from_millis(ms * 20)))
            .collect();
        summarize(outcomes, RampProfile::default()).unwrap()
    }

    #[tokio::test]
    async fn no_hooks_leave_report_untouched() {
        let mut report = report();
        Hooks::default().apply(&mut report).await;
        assert!(report.assertion.is_none());
        assert!(report.formalization.is_none());
    }

    #[tokio::test]
    async fn assertion_failure_is_recorded_not_raised() {
        let kpi = Duration::from_millis(375);
        let hooks = Hooks {
            assert: Some(assert_fn(move |report: &Report| {
                if report.p95 > kpi {
                    Err(format!(
                        "P95 greater than allowed, expected <{kpi:?}, got {:?}",
                        report.p95
                    ))
                } else {
                    Ok(report.p95)
                }
            })),
            formalize: None,
        };

        let mut report = report();
        hooks.apply(&mut report).await;

        assert!(!report.passed());
        let err = report.assertion.as_ref().unwrap().as_ref().unwrap_err();
        assert!(err.to_string().starts_with("P95 greater than allowed"));
    }

    #[tokio::test]
    async fn assertion_value_is_kept() {
        let hooks = Hooks {
            assert: Some(assert_fn(|report: &Report| Ok::<_, TrialError>(report.p95))),
            formalize: None,
        };

        let mut report = report();
        hooks.apply(&mut report).await;

        assert!(report.passed());
        assert_eq!(
            report.assertion_value::<Duration>(),
            Some(&Duration::from_millis(400))
        );
    }

    #[tokio::test]
    async fn formalize_runs_once_after_assert() {
        let order = Arc::new(AtomicUsize::new(0));
        let assert_order = order.clone();
        let formalize_order = order.clone();

        let hooks = Hooks {
            assert: Some(assert_fn(move |_: &Report| {
                Ok::<_, TrialError>(assert_order.fetch_add(1, Ordering::SeqCst))
            })),
            formalize: Some(formalize_fn(move || {
                let order = formalize_order.clone();
                async move {
                    let attempt = order.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(format!("upload {attempt}"))
                }
            })),
        };

        let mut report = report();
        hooks.apply(&mut report).await;

        assert_eq!(report.assertion_value::<usize>(), Some(&0));
        let err = report.formalization.as_ref().unwrap().as_ref().unwrap_err();
        assert_eq!(err.to_string(), "upload 1");
        assert_eq!(order.load(Ordering::SeqCst), 2);
    }
}
