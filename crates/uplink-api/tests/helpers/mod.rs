pub mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;
use uplink_api::state::AppState;
use uplink_core::models::RelayStrategy;
use uplink_core::Config;
use uplink_relay::{NoRetry, WebhookRelay};
use uplink_storage::Storage;

/// Base URL object references are issued under in tests.
pub const PUBLIC_BASE_URL: &str = "http://localhost:5000";

/// Test application state
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<dyn Storage>,
    storage_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    /// Get the HTTP test client
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of objects currently stored (sidecar metadata excluded).
    pub fn stored_object_count(&self) -> usize {
        std::fs::read_dir(&self.storage_path)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| {
                        let name = e.file_name().to_string_lossy().to_string();
                        !name.ends_with(".meta") && !name.ends_with(".part")
                    })
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Setup a test application with isolated storage.
pub async fn setup_test_app(webhook_url: Option<String>, strategy: RelayStrategy) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp storage dir");

    let config = Config {
        server_port: 5000,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        webhook_url,
        relay_strategy: strategy,
        webhook_timeout_seconds: 5,
        webhook_max_retries: 0,
        local_storage_path: temp_dir.path().to_string_lossy().to_string(),
        public_base_url: PUBLIC_BASE_URL.to_string(),
    };

    let storage = uplink_storage::create_storage(&config)
        .await
        .expect("Failed to create test storage");
    let relay =
        WebhookRelay::new(&config, Arc::new(NoRetry)).expect("Failed to create webhook relay");
    let state = Arc::new(AppState::new(config.clone(), storage.clone(), relay));

    let router =
        uplink_api::setup::routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        storage,
        storage_path: temp_dir.path().to_path_buf(),
        _temp_dir: temp_dir,
    }
}

/// One file field of a hand-rolled multipart body.
pub struct MultipartField {
    pub name: &'static str,
    pub filename: &'static str,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

impl MultipartField {
    pub fn photo(data: Vec<u8>) -> Self {
        Self {
            name: "photo",
            filename: "test.png",
            content_type: "image/png",
            data,
        }
    }

    pub fn video(data: Vec<u8>) -> Self {
        Self {
            name: "video",
            filename: "test.mp4",
            content_type: "video/mp4",
            data,
        }
    }
}

/// Encode fields as a multipart/form-data body; returns (content type, body).
pub fn multipart_body(fields: &[MultipartField]) -> (String, Vec<u8>) {
    let boundary = "uplink-test-boundary";
    let mut body = Vec::new();

    for field in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field.name, field.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", field.content_type).as_bytes());
        body.extend_from_slice(&field.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    (
        format!("multipart/form-data; boundary={}", boundary),
        body,
    )
}

/// A tiny valid-enough PNG payload (signature + a few bytes).
pub fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(2048, 0);
    data
}

/// Extract the object key from an issued public URL.
pub fn key_from_public_url(url: &str) -> &str {
    url.rsplit("/objects/").next().expect("URL has /objects/ segment")
}
