//! Package-level constants.

/// Current version of the client (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Zone addressed when none is configured. The backend accepts 1 through 8.
pub const DEFAULT_ZONE: u8 = 1;

/// Highest zone id the backend accepts.
pub const MAX_ZONE: u8 = 8;

/// Path of the live update endpoint, relative to the backend origin.
pub const WS_PATH: &str = "/api/ws";
