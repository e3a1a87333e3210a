//! # tstat-client
//!
//! Client side of the thermostat backend:
//!
//! - [`StateChannel`]: one auto-reconnecting live update subscription that
//!   decodes JSON frames and hands them, in wire order, to a single handler
//! - [`HttpClient`]: the request/response seam to the configuration API, with
//!   a `reqwest` implementation
//! - [`ThermostatSession`]: owns the state mirrors, routes channel frames into
//!   them by source, and issues configuration changes
//!
//! Configuration changes are fire-and-confirm: a PUT carries a partial
//! document, and the corrected full snapshot arrives later over the channel.

#![deny(unsafe_code)]

pub mod channel;
pub mod errors;
pub mod events;
pub mod http;
pub mod session;

pub use channel::{ChannelStatus, StateChannel};
pub use errors::{ChannelError, RequestError, SessionError};
pub use events::{SessionEvent, UpdateOrigin};
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use session::{Dispatch, SessionConfig, ThermostatSession};
