//! Test utilities for tally-core
//!
//! This module provides a mock Telegram Bot API server that records every call
//! made against it, for exercising `TelegramClient` without the network.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// A Bot API call received by the mock server
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Path segment carrying the token (`bot<token>`)
    pub bot: String,
    /// API method, e.g. `sendMessage`
    pub method: String,
    /// Raw request body (JSON or multipart), lossily decoded
    pub body: String,
}

impl RecordedCall {
    /// Parse the body as JSON. `Value::Null` for multipart bodies.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Clone, Default)]
struct MockState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    failing: bool,
}

/// Mock Telegram Bot API server
pub struct MockTelegramServer {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTelegramServer {
    /// Start a server that accepts every call
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Start a server that rejects every call with `ok: false`
    pub async fn start_failing() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(failing: bool) -> Self {
        let state = MockState {
            calls: Arc::default(),
            failing,
        };
        let app = Router::new()
            .route("/:bot/:method", post(handle_method))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Calls of one API method
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockTelegramServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_method(
    State(state): State<MockState>,
    Path((bot, method)): Path<(String, String)>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.calls.lock().unwrap().push(RecordedCall {
        bot,
        method,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    if state.failing {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"ok": true, "result": true})))
    }
}
