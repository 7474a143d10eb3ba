//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use lesson_booking::config::AppConfig;
use lesson_booking::http::{AppState, HttpServer};
use lesson_booking::lifecycle::Shutdown;

/// A booking server running on an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config suitable for tests: static files off unless a test opts in.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.static_files.enabled = false;
    config
}

/// Start a server with `config` and wait until it accepts connections.
pub async fn start_server(config: AppConfig) -> TestServer {
    let listener = TcpListener::bind(config.listener.bind_address()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let state = server.state().clone();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    TestServer {
        addr,
        state,
        client,
        shutdown,
    }
}

/// Fresh directory under the system temp dir, unique per call.
#[allow(dead_code)]
pub fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "lesson-booking-{}-{}-{}",
        tag,
        std::process::id(),
        uuid::Uuid::new_v4()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
