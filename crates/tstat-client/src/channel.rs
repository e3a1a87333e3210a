//! Live update channel: a thin, auto-reconnecting client over `tokio-tungstenite`.
//!
//! One [`StateChannel`] owns at most one subscription. Every text (or UTF-8
//! binary) frame is parsed as JSON and handed to the registered handler, once,
//! in the order frames arrived. Frames that fail to parse are logged, reported
//! on [`StateChannel::errors`], and dropped; the subscription carries on.
//!
//! A close frame with code 1000 ends the subscription. Anything else (another
//! close code, a bare TCP drop, a read error, a failed connect) schedules a
//! reconnect with exponential backoff. The handler stays registered across
//! reconnects.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tstat_core::ReconnectConfig;

use crate::errors::{ChannelError, excerpt};

/// Capacity of the error fan-out. Slow subscribers miss the oldest errors.
const ERROR_CAPACITY: usize = 64;

/// Connection state of a [`StateChannel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelStatus {
    /// `start` has not been called.
    Idle,
    /// Dialing for the first time.
    Connecting,
    /// Receiving frames.
    Connected,
    /// Waiting `delay_ms` before reconnect attempt `attempt`.
    Reconnecting {
        /// 1-based attempt number since the last successful connection.
        attempt: u32,
        /// Backoff before the attempt.
        delay_ms: u64,
    },
    /// Ended by a normal close or by [`StateChannel::close`].
    Closed,
    /// Reconnect attempts exhausted.
    GaveUp,
}

/// Shared by the handle and the worker task.
struct Shared {
    status: watch::Sender<ChannelStatus>,
    errors: broadcast::Sender<ChannelError>,
}

impl Shared {
    fn set_status(&self, status: ChannelStatus) {
        let _ = self.status.send_replace(status);
    }

    fn report(&self, err: ChannelError) {
        // No subscribers is fine
        let _ = self.errors.send(err);
    }
}

/// A single live update subscription.
pub struct StateChannel {
    config: ReconnectConfig,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StateChannel {
    /// Create an idle channel with the given reconnect policy.
    pub fn new(config: ReconnectConfig) -> Self {
        let (status, _) = watch::channel(ChannelStatus::Idle);
        let (errors, _) = broadcast::channel(ERROR_CAPACITY);
        Self {
            config,
            shared: Arc::new(Shared { status, errors }),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    /// Open the subscription and register `on_message`.
    ///
    /// Returns immediately; connecting happens on a spawned task, so this must
    /// be called from within a Tokio runtime. A channel can be started once.
    pub fn start<F>(&self, url: impl Into<String>, on_message: F) -> Result<(), ChannelError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        let mut task = self.task.lock();
        if task.is_some() {
            return Err(ChannelError::AlreadyStarted);
        }

        let worker = Worker {
            url: url.into(),
            config: self.config.clone(),
            shared: Arc::clone(&self.shared),
            handler: Box::new(on_message),
        };
        info!(url = %worker.url, "starting live channel");
        *task = Some(tokio::spawn(worker.run(self.cancel.clone())));
        Ok(())
    }

    /// Whether `start` has been called.
    pub fn is_started(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Watch connection state changes.
    pub fn status(&self) -> watch::Receiver<ChannelStatus> {
        self.shared.status.subscribe()
    }

    /// Current connection state.
    pub fn current_status(&self) -> ChannelStatus {
        self.shared.status.borrow().clone()
    }

    /// Subscribe to decode and transport errors.
    pub fn errors(&self) -> broadcast::Receiver<ChannelError> {
        self.shared.errors.subscribe()
    }

    /// Stop the subscription. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
        if self.task.lock().is_none() {
            self.shared.set_status(ChannelStatus::Closed);
        }
    }
}

impl Drop for StateChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// How one connection ended.
#[derive(Debug, PartialEq, Eq)]
enum Ended {
    /// Peer sent close code 1000.
    Normal,
    /// Anything else. `connected` is false when the dial itself failed.
    Abnormal { connected: bool },
}

struct Worker {
    url: String,
    config: ReconnectConfig,
    shared: Arc<Shared>,
    handler: Box<dyn FnMut(Value) + Send>,
}

impl Worker {
    async fn run(mut self, cancel: CancellationToken) {
        let mut failures: u32 = 0;
        self.shared.set_status(ChannelStatus::Connecting);

        loop {
            let ended = tokio::select! {
                () = cancel.cancelled() => break,
                ended = self.connect_and_pump() => ended,
            };

            match ended {
                Ended::Normal => {
                    info!(url = %self.url, "live channel closed normally");
                    break;
                }
                Ended::Abnormal { connected } => {
                    if connected {
                        failures = 0;
                    }
                    failures = failures.saturating_add(1);
                    if self.config.exhausted(failures) {
                        let attempts = failures - 1;
                        warn!(url = %self.url, attempts, "giving up on live channel");
                        self.shared.report(ChannelError::GaveUp { attempts });
                        self.shared.set_status(ChannelStatus::GaveUp);
                        return;
                    }

                    let delay_ms = self.config.delay_ms(failures);
                    debug!(url = %self.url, attempt = failures, delay_ms, "scheduling reconnect");
                    self.shared.set_status(ChannelStatus::Reconnecting {
                        attempt: failures,
                        delay_ms,
                    });
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                    }
                }
            }
        }

        self.shared.set_status(ChannelStatus::Closed);
    }

    async fn connect_and_pump(&mut self) -> Ended {
        let mut ws = match connect_async(self.url.as_str()).await {
            Ok((ws, _)) => ws,
            Err(e) => {
                warn!(url = %self.url, error = %e, "live channel connect failed");
                self.shared.report(ChannelError::Connect {
                    url: self.url.clone(),
                    message: e.to_string(),
                });
                return Ended::Abnormal { connected: false };
            }
        };

        info!(url = %self.url, "live channel connected");
        self.shared.set_status(ChannelStatus::Connected);

        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => self.deliver(text.as_str()),
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => self.deliver(text),
                    Err(e) => self.reject(&e.to_string(), &String::from_utf8_lossy(&bytes)),
                },
                Some(Ok(Message::Close(frame))) => return close_outcome(frame.as_ref()),
                // Ping/pong are answered by the transport
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(url = %self.url, error = %e, "live channel read failed");
                    self.shared.report(ChannelError::Transport(e.to_string()));
                    return Ended::Abnormal { connected: true };
                }
                None => {
                    warn!(url = %self.url, "live channel dropped without close frame");
                    return Ended::Abnormal { connected: true };
                }
            }
        }
    }

    fn deliver(&mut self, text: &str) {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => (self.handler)(value),
            Err(e) => self.reject(&e.to_string(), text),
        }
    }

    fn reject(&self, message: &str, frame: &str) {
        let excerpt = excerpt(frame, 120);
        warn!(error = message, frame = %excerpt, "dropping undecodable frame");
        self.shared.report(ChannelError::Decode {
            message: message.to_string(),
            excerpt,
        });
    }
}

fn close_outcome(frame: Option<&CloseFrame>) -> Ended {
    match frame {
        Some(f) if f.code == CloseCode::Normal => Ended::Normal,
        Some(f) => {
            debug!(code = %f.code, reason = f.reason.as_str(), "live channel closed abnormally");
            Ended::Abnormal { connected: true }
        }
        None => Ended::Abnormal { connected: true },
    }
}
