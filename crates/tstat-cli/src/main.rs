//! # tstat
//!
//! Command line view over a thermostat session: watch the live channel, read
//! the mirrors, and issue configuration changes.

#![deny(unsafe_code)]

mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tstat_client::{ReqwestHttpClient, SessionConfig, ThermostatSession};
use tstat_core::constants::MAX_ZONE;
use tstat_core::{FanMode, Mode, VacationConfig};
use tstat_settings::TstatSettings;

/// Thermostat control and live monitor.
#[derive(Parser, Debug)]
#[command(name = "tstat", version, about = "Thermostat control and live monitor")]
struct Cli {
    /// Configuration API origin (overrides settings).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Live channel URL (overrides settings).
    #[arg(long, global = true)]
    ws_url: Option<String>,

    /// Zone to address (overrides settings).
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(1..=i64::from(MAX_ZONE)))]
    zone: Option<u8>,

    /// Path to the settings file.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Stream state changes until Ctrl-C.
    Watch,
    /// Fetch and print the thermostat state.
    Show,
    /// Set the fan mode.
    Fan {
        /// auto, low, med or high.
        speed: FanMode,
    },
    /// Set the operating mode.
    Mode {
        /// heat, cool, auto or off.
        mode: Mode,
    },
    /// Turn the setpoint hold on or off.
    Hold {
        /// on or off.
        state: Toggle,
    },
    /// Raise or lower the cool setpoint.
    Cool {
        /// Degrees to add (negative lowers).
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Raise or lower the heat setpoint.
    Heat {
        /// Degrees to add (negative lowers).
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Fetch and print air handler readings.
    Blower,
    /// Fetch and print heat pump readings.
    Heatpump,
    /// Fetch and print the thermostat settings table.
    Settings,
    /// Show vacation settings, or update them when any field is given.
    Vacation(VacationArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn is_on(self) -> bool {
        self == Self::On
    }
}

#[derive(Args, Debug, Default, PartialEq)]
struct VacationArgs {
    /// Enable or disable vacation mode.
    #[arg(long)]
    active: Option<bool>,
    /// Length in days.
    #[arg(long)]
    days: Option<u8>,
    /// Lowest temperature to allow.
    #[arg(long)]
    min_temperature: Option<u8>,
    /// Highest temperature to allow.
    #[arg(long)]
    max_temperature: Option<u8>,
    /// Lowest relative humidity to allow.
    #[arg(long)]
    min_humidity: Option<u8>,
    /// Highest relative humidity to allow.
    #[arg(long)]
    max_humidity: Option<u8>,
    /// Fan mode while away.
    #[arg(long)]
    fan_mode: Option<FanMode>,
}

impl From<VacationArgs> for VacationConfig {
    fn from(args: VacationArgs) -> Self {
        Self {
            active: args.active,
            days: args.days,
            min_temperature: args.min_temperature,
            max_temperature: args.max_temperature,
            min_humidity: args.min_humidity,
            max_humidity: args.max_humidity,
            fan_mode: args.fan_mode,
        }
    }
}

/// Load settings from the file and environment, then apply flag overrides.
fn resolve_settings(cli: &Cli) -> Result<TstatSettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(tstat_settings::settings_path);
    let mut settings = tstat_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;

    if let Some(url) = &cli.url {
        settings.server.base_url.clone_from(url);
    }
    if let Some(ws_url) = &cli.ws_url {
        settings.server.ws_url = Some(ws_url.clone());
    }
    if let Some(zone) = cli.zone {
        settings.zone = zone;
    }
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;

    if settings.logging.json {
        tstat_core::logging::init_json_subscriber(&settings.logging.level);
    } else {
        tstat_core::logging::init_subscriber(&settings.logging.level);
    }

    let http = Arc::new(ReqwestHttpClient::with_timeout(Duration::from_millis(
        settings.http.timeout_ms,
    )));
    let session = ThermostatSession::new(
        http,
        SessionConfig {
            base_url: settings.server.api_base()?,
            zone: settings.zone,
            reconnect: settings.reconnect.clone(),
        },
    );
    let live_url = settings.server.live_url()?;
    tracing::debug!(zone = settings.zone, %live_url, "session ready");

    let result = commands::run(&session, &live_url, cli.command).await;
    session.close();
    result
}
