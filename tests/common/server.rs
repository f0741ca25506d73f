//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database and upload dir.

use super::constants::*;
use super::fixtures::create_test_db_with_users;
use skillshare_server::media::{MediaStorage, MediaStorageConfig};
use skillshare_server::server::make_app;
use skillshare_server::user::auth::TokenIssuer;
use skillshare_server::{PlatformStore, RequestsLoggingLevel, ServerConfig, ServerState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated database and uploads
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store for direct database access in tests
    pub store: Arc<dyn PlatformStore>,

    /// Directory uploaded media land in
    pub upload_dir: PathBuf,

    pub alice_id: usize,
    pub bob_id: usize,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary database with two users, alice and bob
    /// 2. Binds to a random port (127.0.0.1:0)
    /// 3. Spawns the server in a background task
    /// 4. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound
    /// or the server does not become ready within timeout.
    pub async fn spawn() -> Self {
        let (temp_db_dir, store, users) =
            create_test_db_with_users().expect("Failed to create test database");
        let store: Arc<dyn PlatformStore> = Arc::new(store);
        let upload_dir = temp_db_dir.path().join("uploads");

        let media = Arc::new(MediaStorage::new(MediaStorageConfig {
            upload_dir: upload_dir.clone(),
            base_url: "/uploads".to_string(),
            max_image_bytes: TEST_MAX_IMAGE_BYTES,
            max_video_bytes: TEST_MAX_VIDEO_BYTES,
        }));
        media.init().await.expect("Failed to create upload dir");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            upload_dir: upload_dir.clone(),
            uploads_base_url: "/uploads".to_string(),
            max_request_bytes: skillshare_server::server::config::max_request_bytes(
                TEST_MAX_IMAGE_BYTES,
                TEST_MAX_VIDEO_BYTES,
            ),
        };
        let state = ServerState::new(
            config,
            store.clone(),
            media,
            TokenIssuer::new(TEST_JWT_SECRET.as_bytes()),
        );
        let app = make_app(state);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        // Wait for server to be ready
        let server = Self {
            base_url,
            port,
            store,
            upload_dir,
            alice_id: users.alice,
            bob_id: users.bob,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// Signs a token for `user_id` as if issued at `issued_at`.
    pub fn token_issued_at(&self, user_id: usize, issued_at: i64) -> String {
        TokenIssuer::new(TEST_JWT_SECRET.as_bytes())
            .issue(user_id, issued_at)
            .expect("Failed to issue token")
    }

    /// Number of files currently in the upload dir.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
