//! # tstat-settings
//!
//! Configuration for the thermostat client, loaded from three layers (in
//! priority order):
//! 1. **Compiled defaults**: [`TstatSettings::default()`]
//! 2. **User file**: `~/.tstat/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `TSTAT_*` overrides (highest priority)
//!
//! Command line flags are applied by the binary on top of the result.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
