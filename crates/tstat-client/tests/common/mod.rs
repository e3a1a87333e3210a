//! In-process WebSocket backend for channel and session tests.

#![allow(dead_code)]

use std::time::Duration;

use futures::SinkExt;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tstat_core::ReconnectConfig;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub type ServerSocket = WebSocketStream<TcpStream>;

/// Accepts WebSocket connections and hands each one to the test.
pub struct LiveServer {
    pub url: String,
    accepted: mpsc::UnboundedReceiver<ServerSocket>,
}

impl LiveServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, accepted) = mpsc::unbounded_channel();
        let _accept_loop = tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                if let Ok(ws) = tokio_tungstenite::accept_async(tcp).await {
                    if tx.send(ws).is_err() {
                        break;
                    }
                }
            }
        });
        Self {
            url: format!("ws://{addr}/api/ws"),
            accepted,
        }
    }

    /// Wait for the next client connection.
    pub async fn accept(&mut self) -> ServerSocket {
        timeout(TIMEOUT, self.accepted.recv())
            .await
            .expect("no connection within timeout")
            .expect("accept loop ended")
    }

    /// Whether a client connects within `wait`.
    pub async fn connects_within(&mut self, wait: Duration) -> bool {
        matches!(timeout(wait, self.accepted.recv()).await, Ok(Some(_)))
    }
}

pub async fn push(ws: &mut ServerSocket, frame: &Value) {
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

pub async fn push_raw(ws: &mut ServerSocket, text: &str) {
    ws.send(Message::text(text.to_string())).await.unwrap();
}

pub async fn close_with(mut ws: ServerSocket, code: CloseCode) {
    let _ = ws
        .close(Some(CloseFrame {
            code,
            reason: "test".into(),
        }))
        .await;
}

/// Reconnect quickly and deterministically.
pub fn fast_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        base_delay_ms: 10,
        max_delay_ms: 50,
        jitter_factor: 0.0,
        max_attempts: None,
    }
}
