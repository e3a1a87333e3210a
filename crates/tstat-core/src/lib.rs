//! # tstat-core
//!
//! Shared vocabulary for the thermostat client crates:
//!
//! - **Wire messages**: [`InboundMessage`] frames pushed over the live channel
//! - **Mirrors**: [`ThermostatState`], [`BlowerState`], [`HeatPumpState`], client-side
//!   copies of server-authoritative state, replaced wholesale on every update
//! - **Settings values**: [`FanMode`], [`Mode`], [`VacationConfig`]
//! - **Reconnect**: [`ReconnectConfig`] and the backoff math the live channel uses
//! - **Logging**: [`logging::init_subscriber`]

#![deny(unsafe_code)]

pub mod constants;
pub mod logging;
pub mod message;
pub mod modes;
pub mod retry;
pub mod state;
pub mod vacation;

pub use message::{InboundMessage, Source};
pub use modes::{FanMode, Mode, ParseModeError};
pub use retry::ReconnectConfig;
pub use state::{BlowerState, HeatPumpState, MirrorError, ThermostatState};
pub use vacation::VacationConfig;
