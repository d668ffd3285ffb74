mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;

    use ntest::timeout;
    use plateau::prelude::*;
    use reqwest::{Client, StatusCode};
    use std::time::Duration;

    #[tokio::test]
    #[timeout(30_000)]
    async fn steady_plan_against_work() {
        let report = work_plan("steady-work", "error_ratio=0&min_ms=10&max_ms=20")
            .rps(5)
            .duration(Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(report.request_count, 10);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.error_rate, 0.);
        assert!(report.p50 >= Duration::from_millis(10));
        assert!(report.p50 <= report.p99);
        assert!(report.ramping.ramp_up.is_empty());
        assert!(report.passed());
    }

    #[tokio::test]
    #[timeout(30_000)]
    async fn error_statuses_are_counted() {
        let report = work_plan("failing-work", "error_ratio=1&min_ms=1&max_ms=5")
            .rps(4)
            .duration(Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(report.request_count, 4);
        assert_eq!(report.error_count, 4);
        assert_eq!(report.error_rate, 1.);
        assert!(report.outcomes.iter().all(|o| o.is_err()));
    }

    #[tokio::test]
    #[timeout(30_000)]
    async fn assert_hook_rejects_slow_service() {
        let kpi = Duration::from_millis(10);
        let url = format!("{}/delay/ms/50", init());

        let report = Plan::new("slow-delay")
            .setup(|| async { Ok::<_, TrialError>(Client::new()) })
            .execute(move |client| {
                let url = url.clone();
                async move {
                    let res = client?.get(url).send().await?.error_for_status()?;
                    Ok::<_, anyhow::Error>(res.status())
                }
            })
            .cleanup(|status| async move {
                match status {
                    Ok(status) if status != StatusCode::OK => {
                        Err(format!("unexpected status {status}"))
                    }
                    _ => Ok(()),
                }
            })
            .rps(3)
            .duration(Duration::from_secs(1))
            .assert(move |report: &Report| {
                if report.p95 > kpi {
                    Err(format!("P95 {:?} over {kpi:?}", report.p95))
                } else {
                    Ok(report.p95)
                }
            })
            .await
            .unwrap();

        assert_eq!(report.request_count, 3);
        assert!(report.p50 >= Duration::from_millis(50));
        assert!(!report.passed());
    }

    /* Plan Helpers */

    fn work_plan(name: &str, query: &str) -> Plan<Client, StatusCode> {
        let url = format!("{}/work?{query}", init());

        Plan::new(name)
            .setup(|| async { Ok::<_, TrialError>(Client::new()) })
            .execute(move |client| {
                let url = url.clone();
                async move {
                    let res = client?.get(url).send().await?.error_for_status()?;
                    Ok::<_, anyhow::Error>(res.status())
                }
            })
            .cleanup(|_| async { Ok::<_, TrialError>(()) })
    }
}
