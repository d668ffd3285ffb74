use plateau::prelude::*;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("plateau=debug")
        .init();

    let report = Plan::new("ramped-chaos")
        .diagnostics(WriterDiagnostics::stderr())
        .setup(|| async { Ok::<_, TrialError>(Client::new()) })
        .execute(|client| async move {
            let res = client?
                .get("http://0.0.0.0:3000/chaos")
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, anyhow::Error>(res.status())
        })
        .cleanup(|status| async move {
            match status {
                Ok(status) if status == StatusCode::OK => Ok(()),
                Ok(status) => Err(format!("unexpected status {status}")),
                Err(err) => Err(format!("request failed: {err}")),
            }
        })
        .rps(50)
        .ramping(Duration::from_secs(20))
        .duration(Duration::from_secs(60))
        .assert(|report: &Report| {
            if report.error_rate > 0.9 {
                Err(format!("error rate {:.2} over 0.9", report.error_rate))
            } else {
                Ok(report.error_rate)
            }
        })
        .formalize(|| async {
            tracing::info!("Would upload the report here");
            Ok::<_, TrialError>(())
        })
        .await?;

    println!("{report}");
    if !report.passed() {
        anyhow::bail!("assertion failed");
    }
    Ok(())
}
