mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;

    use ntest::timeout;
    use plateau::prelude::*;
    use reqwest::Client;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    #[timeout(30_000)]
    async fn ramp_trials_run_but_are_not_measured() {
        let url = format!("{}/delay/ms/5", init());
        let executions = Arc::new(AtomicUsize::new(0));
        let counter = executions.clone();

        let report = Plan::new("ramped-delay")
            .setup(|| async { Ok::<_, TrialError>(Client::new()) })
            .execute(move |client| {
                let url = url.clone();
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    client?.get(url).send().await?.error_for_status()?;
                    Ok::<_, anyhow::Error>(())
                }
            })
            .cleanup(|_| async { Ok::<_, TrialError>(()) })
            .rps(4)
            .ramping(Duration::from_secs(2))
            .duration(Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(report.request_count, 4);
        assert!(!report.ramping.ramp_up.is_empty());
        assert!(!report.ramping.ramp_down.is_empty());
        assert_eq!(
            executions.load(Ordering::SeqCst),
            report.ramping.launched() as usize + report.request_count
        );
    }

    #[tokio::test]
    #[timeout(30_000)]
    async fn formalize_runs_after_the_run() {
        let url = format!("{}/delay/ms/1", init());
        let formalized = Arc::new(AtomicUsize::new(0));
        let seen = formalized.clone();

        let report = Plan::new("formalized-delay")
            .setup(|| async { Ok::<_, TrialError>(Client::new()) })
            .execute(move |client| {
                let url = url.clone();
                async move {
                    client?.get(url).send().await?;
                    Ok::<_, anyhow::Error>(())
                }
            })
            .cleanup(|_| async { Ok::<_, TrialError>(()) })
            .rps(2)
            .duration(Duration::from_secs(1))
            .formalize(move || {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TrialError>("uploaded")
                }
            })
            .await
            .unwrap();

        assert_eq!(formalized.load(Ordering::SeqCst), 1);
        assert!(matches!(report.formalization, Some(Ok(_))));
    }
}
