//! In-process mock webhook endpoint for integration tests.

use std::sync::{Arc, Mutex};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;

/// One request the mock endpoint received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Handle to a running mock webhook server.
pub struct MockWebhook {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockWebhook {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Spawn a webhook endpoint on an ephemeral port that records every request
/// and answers with the given status and JSON body.
pub async fn spawn_webhook(status: StatusCode, response_body: serde_json::Value) -> MockWebhook {
    let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    let app = Router::new().route(
        "/hook",
        post(move |headers: HeaderMap, body: Bytes| {
            let recorded = recorded.clone();
            let response_body = response_body.clone();
            async move {
                recorded.lock().unwrap().push(RecordedRequest {
                    content_type: headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string(),
                    body: body.to_vec(),
                });
                (status, Json(response_body))
            }
        }),
    )
    // Accept full-size passthrough bodies.
    .layer(DefaultBodyLimit::disable());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock webhook listener");
    let addr = listener.local_addr().expect("Mock webhook has local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock webhook serve failed");
    });

    MockWebhook {
        url: format!("http://{}/hook", addr),
        requests,
    }
}

/// An address nothing is listening on: bind an ephemeral port, then drop the
/// listener so connections are refused.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Probe listener has local addr");
    drop(listener);
    format!("http://{}/hook", addr)
}
