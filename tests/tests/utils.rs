use std::net::{SocketAddr, TcpListener};
use std::sync::OnceLock;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

/// Start the mock service once per test binary and return its base url.
///
/// The service gets its own thread and runtime so it outlives the runtime of whichever test
/// happens to start it.
#[allow(unused)]
pub fn init() -> &'static str {
    static BASE_URL: OnceLock<String> = OnceLock::new();

    BASE_URL.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter("plateau=debug,mock_service=info")
            .try_init();

        let listener = TcpListener::bind("127.0.0.1:0".parse::<SocketAddr>().unwrap()).unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                if let Err(err) = mock_service::serve(listener).await {
                    error!("Mock service stopped: {err}");
                }
            });
        });

        format!("http://{addr}")
    })
}
