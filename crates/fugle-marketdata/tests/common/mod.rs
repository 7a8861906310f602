/*
[INPUT]:  Test scenarios needing a WebSocket or HTTP peer
[OUTPUT]: Shared test utilities, fixtures, and mock servers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for fugle-marketdata tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use wiremock::MockServer;

pub use fugle_marketdata::constants::UNAUTHENTICATED_MESSAGE;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Replies the mock streaming server sends for one inbound frame
pub type Responder = Arc<dyn Fn(&Value) -> Vec<Value> + Send + Sync>;

/// In-process WebSocket peer that records every frame it receives
pub struct MockWsServer {
    pub url: String,
    frames: Arc<Mutex<Vec<Value>>>,
    closed_rx: watch::Receiver<usize>,
}

impl MockWsServer {
    /// Accept connections on 127.0.0.1, answering with `responder`.
    /// `greeting` is sent right after the handshake, before any frame arrives.
    pub async fn start_with_greeting(greeting: Vec<Value>, responder: Responder) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock ws");
        let addr = listener.local_addr().expect("local addr");
        let frames = Arc::new(Mutex::new(Vec::new()));
        let (closed_tx, closed_rx) = watch::channel(0usize);

        let recorded = frames.clone();
        tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                let Ok(ws) = accept_async(tcp).await else {
                    continue;
                };
                let (mut write, mut read) = ws.split();
                for frame in &greeting {
                    let _ = write.send(Message::Text(frame.to_string().into())).await;
                }
                while let Some(Ok(message)) = read.next().await {
                    match message {
                        Message::Text(text) => {
                            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                                continue;
                            };
                            recorded.lock().unwrap().push(value.clone());
                            for reply in responder(&value) {
                                let _ = write.send(Message::Text(reply.to_string().into())).await;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
                closed_tx.send_modify(|count| *count += 1);
            }
        });

        Self {
            url: format!("ws://{addr}"),
            frames,
            closed_rx,
        }
    }

    pub async fn start(responder: Responder) -> Self {
        Self::start_with_greeting(Vec::new(), responder).await
    }

    pub fn frames(&self) -> Vec<Value> {
        self.frames.lock().unwrap().clone()
    }

    pub fn frames_with_event(&self, event: &str) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter(|frame| frame["event"] == event)
            .collect()
    }

    /// Wait until `count` client connections have closed
    pub async fn wait_closed(&self, count: usize, timeout: Duration) -> bool {
        let mut rx = self.closed_rx.clone();
        tokio::time::timeout(timeout, rx.wait_for(|closed| *closed >= count))
            .await
            .map(|result| result.is_ok())
            .unwrap_or(false)
    }
}

pub fn authenticated_frame() -> Value {
    json!({ "event": "authenticated", "data": { "message": "Authenticated successfully" } })
}

pub fn unauthenticated_frame() -> Value {
    json!({ "event": "error", "data": { "message": UNAUTHENTICATED_MESSAGE } })
}

/// Accept any auth frame
pub fn accept_auth() -> Responder {
    Arc::new(|frame: &Value| {
        if frame["event"] == "auth" {
            vec![authenticated_frame()]
        } else {
            Vec::new()
        }
    })
}

/// Accept auth and answer every ping with a pong
pub fn accept_auth_and_pong() -> Responder {
    Arc::new(|frame: &Value| match frame["event"].as_str() {
        Some("auth") => vec![authenticated_frame()],
        Some("ping") => vec![json!({ "event": "pong", "data": { "time": 1 } })],
        _ => Vec::new(),
    })
}

pub fn reject_auth() -> Responder {
    Arc::new(|frame: &Value| {
        if frame["event"] == "auth" {
            vec![unauthenticated_frame()]
        } else {
            Vec::new()
        }
    })
}

pub fn silent() -> Responder {
    Arc::new(|_frame: &Value| Vec::new())
}

/// Poll `check` until it holds or `timeout` passes
pub async fn eventually<F: Fn() -> bool>(timeout: Duration, check: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
