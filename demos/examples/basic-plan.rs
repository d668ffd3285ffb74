use plateau::prelude::*;
use reqwest::Client;
use std::time::Duration;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("plateau=info")
        .init();

    let report = Plan::new("basic-work")
        .setup(|| async { Ok::<_, TrialError>(Client::new()) })
        .execute(|client| async move {
            client?
                .get("http://0.0.0.0:3000/work")
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, anyhow::Error>(())
        })
        .cleanup(|_| async { Ok::<_, TrialError>(()) })
        .rps(20)
        .duration(Duration::from_secs(30))
        .await?;

    println!("{report}");
    Ok(())
}
