//! Client error types.
//!
//! Channel and request errors are `Clone` because they are fanned out to
//! subscribers and kept as the session's last visible failure.

use thiserror::Error;

/// Live channel failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// `start` was called on a channel that already has a subscription.
    #[error("channel already started")]
    AlreadyStarted,

    /// Opening the connection failed.
    #[error("failed to connect to {url}: {message}")]
    Connect {
        /// Endpoint that was dialed.
        url: String,
        /// Transport error text.
        message: String,
    },

    /// An established connection failed while reading.
    #[error("transport error: {0}")]
    Transport(String),

    /// A frame was not valid UTF-8 JSON. The frame is dropped.
    #[error("undecodable frame: {message}")]
    Decode {
        /// Parser error text.
        message: String,
        /// Leading part of the offending frame.
        excerpt: String,
    },

    /// Reconnect attempts ran out.
    #[error("gave up after {attempts} reconnect attempts")]
    GaveUp {
        /// Number of reconnect attempts made.
        attempts: u32,
    },
}

/// Configuration API failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {message}")]
    Transport {
        /// Transport error text.
        message: String,
    },

    /// No response within the configured timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as sent.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("invalid response body: {message}")]
    Decode {
        /// Parser error text.
        message: String,
    },
}

/// Errors returned by [`ThermostatSession`](crate::ThermostatSession) operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An HTTP call failed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The live channel could not be started.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// An increment needs a cached value that the mirror does not hold.
    #[error("no numeric '{field}' in the cached thermostat state")]
    MissingField {
        /// The absent wire field.
        field: &'static str,
    },
}

/// Keep at most `max` characters of `text` for error messages.
pub(crate) fn excerpt(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
