//! Notifications emitted by a session.
//!
//! A view layer subscribes with
//! [`ThermostatSession::subscribe`](crate::ThermostatSession::subscribe) and
//! re-reads the mirrors when it sees [`SessionEvent::StateChanged`].

use tstat_core::Source;

use crate::errors::RequestError;

/// What replaced a mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOrigin {
    /// A frame pushed over the live channel.
    Channel,
    /// An explicit GET issued by the session.
    Fetch,
}

/// Session notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A mirror was replaced.
    StateChanged {
        /// Which mirror.
        source: Source,
        /// What replaced it.
        origin: UpdateOrigin,
    },
    /// An HTTP operation failed. The mirrors are untouched.
    RequestFailed {
        /// Session operation that issued the request.
        operation: &'static str,
        /// The failure.
        error: RequestError,
    },
    /// A channel frame decoded as JSON but was not a usable message.
    MessageRejected {
        /// Why it was dropped.
        reason: String,
    },
}
