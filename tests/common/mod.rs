//! Shared fixtures and a real-socket test server.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use twist::config::Config;
use twist::corpus::TwistExample;
use twist::gateway::{HandlerState, create_router_with_state};
use twist::service::TwistService;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

/// The corpus shipped with the repository.
pub fn bundled_corpus_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/twists.json")
}

pub fn example(id: &str, genre: &str, setup: &str, twist: &str) -> TwistExample {
    TwistExample {
        id: id.to_string(),
        genre: genre.to_string(),
        story_setup: setup.to_string(),
        twist: twist.to_string(),
        tags: vec![genre.to_string()],
    }
}

/// Three examples, none of them sci-fi.
pub fn ghost_corpus() -> Vec<TwistExample> {
    vec![
        example("g1", "horror", "A ghost haunts a house", "The ghost is alive"),
        example(
            "g2",
            "horror",
            "A family hears whispers in the walls of their new home",
            "The family are the ghosts",
        ),
        example(
            "m1",
            "mystery",
            "A detective investigates a theft at a manor",
            "The detective staged the theft",
        ),
    ]
}

pub fn write_corpus(dir: &Path, name: &str, corpus: &[TwistExample]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(corpus).unwrap()).unwrap();
    path
}

/// Offline config over `corpus_path`, with an index snapshot inside `dir`.
pub fn offline_config(dir: &Path, corpus_path: PathBuf) -> Config {
    Config {
        corpus_path,
        index_path: Some(dir.join("index.rkyv")),
        mock_provider: true,
        ..Config::default()
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Starts the full stack on an ephemeral port: bundled corpus, stub embedder,
/// offline generator.
pub async fn spawn_test_server() -> TestServer {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = offline_config(temp_dir.path(), bundled_corpus_path());
    let service = TwistService::from_config(&config).unwrap();
    let app = create_router_with_state(HandlerState::new(Arc::new(service)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(addr).await;

    TestServer {
        addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    }
}

async fn wait_for_server_ready(addr: SocketAddr) {
    let start = std::time::Instant::now();
    while tokio::net::TcpStream::connect(addr).await.is_err() {
        assert!(
            start.elapsed() < Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
            "server did not start on {addr}"
        );
        tokio::time::sleep(Duration::from_millis(STARTUP_POLL_INTERVAL_MS)).await;
    }
}
