//! Demo system under test.
//!
//! Every endpoint sleeps for a while and then answers with some status code, which is all a
//! load test needs to produce interesting latency and error statistics.
use axum::{
    debug_handler,
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Router,
};
use metrics::counter;
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const ERROR_STATUSES: [StatusCode; 7] = [
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
    StatusCode::CONFLICT,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::NOT_IMPLEMENTED,
];

pub fn router() -> Router {
    Router::new()
        .route("/work", get(work))
        .route("/chaos", get(chaos))
        .route("/delay/ms/:delay_ms", get(delay))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    serve(listener).await
}

pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    info!("Serving on {}", listener.local_addr()?);
    axum::serve(listener, router()).await
}

/// Latency range and failure odds for `/work`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WorkParams {
    pub min_ms: u64,
    pub max_ms: u64,
    pub error_ratio: f64,
}

impl Default for WorkParams {
    fn default() -> Self {
        Self {
            min_ms: 100,
            max_ms: 400,
            error_ratio: 0.2,
        }
    }
}

/// Sleeps `min_ms..max_ms`, then fails with a random error status `error_ratio` of the time.
#[debug_handler]
pub async fn work(Query(params): Query<WorkParams>) -> (StatusCode, String) {
    count_request();

    let (effort, status) = {
        let mut rng = rand::thread_rng();
        let effort = Duration::from_millis(random_ms(&mut rng, params.min_ms, params.max_ms));
        let status = if rng.gen_bool(params.error_ratio.clamp(0., 1.)) {
            random_error(&mut rng)
        } else {
            StatusCode::OK
        };
        (effort, status)
    };

    tokio::time::sleep(effort).await;
    debug!("work took {effort:?}, answering {status}");
    (status, format!("work took this long: {effort:?}\n"))
}

/// Sleeps 300-400ms, then answers with any status, success included, with equal odds.
#[debug_handler]
pub async fn chaos() -> (StatusCode, String) {
    count_request();

    let (effort, status) = {
        let mut rng = rand::thread_rng();
        let effort = Duration::from_millis(random_ms(&mut rng, 300, 400));
        let status = if rng.gen_range(0..=ERROR_STATUSES.len()) == 0 {
            StatusCode::OK
        } else {
            random_error(&mut rng)
        };
        (effort, status)
    };

    tokio::time::sleep(effort).await;
    (status, format!("work took this long: {effort:?}\n"))
}

#[debug_handler]
pub async fn delay(Path(delay_ms): Path<u64>) {
    count_request();
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}

/** Utils **/

fn random_ms(rng: &mut impl Rng, min_ms: u64, max_ms: u64) -> u64 {
    if max_ms > min_ms {
        rng.gen_range(min_ms..max_ms)
    } else {
        min_ms
    }
}

fn random_error(rng: &mut impl Rng) -> StatusCode {
    *ERROR_STATUSES
        .choose(rng)
        .unwrap_or(&StatusCode::INTERNAL_SERVER_ERROR)
}

fn count_request() {
    counter!("mock-service.requests").increment(1);
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);
}

/** TPS Printer **/

static TPS_MEASURE: AtomicU64 = AtomicU64::new(0);

pub async fn tps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let transactions = TPS_MEASURE.swap(0, Ordering::Relaxed);
        info!("{transactions} TPS");
    }
}
