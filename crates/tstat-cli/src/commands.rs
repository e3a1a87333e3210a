//! Command execution against a live session.

use std::fmt::Display;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tstat_client::{ChannelStatus, SessionEvent, ThermostatSession};
use tstat_core::{Source, ThermostatState, VacationConfig};

use crate::Command;

pub(crate) async fn run(session: &ThermostatSession, live_url: &str, command: Command) -> Result<()> {
    match command {
        Command::Watch => watch(session, live_url).await,
        Command::Show => {
            let tstat = session.refresh_state().await?;
            println!("{}", summary(&tstat));
            print_json(&tstat.to_value())
        }
        Command::Fan { speed } => {
            session.set_fan_speed(speed).await?;
            println!("fan mode set to {speed}");
            Ok(())
        }
        Command::Mode { mode } => {
            session.set_mode(mode).await?;
            println!("mode set to {mode}");
            Ok(())
        }
        Command::Hold { state } => {
            session.set_hold(state.is_on()).await?;
            println!("hold {}", if state.is_on() { "on" } else { "off" });
            Ok(())
        }
        Command::Cool { delta } => {
            let _ = session.refresh_state().await?;
            let sent = session.inc_cool_setpoint(delta).await?;
            println!("cool setpoint set to {sent}");
            Ok(())
        }
        Command::Heat { delta } => {
            let _ = session.refresh_state().await?;
            let sent = session.inc_heat_setpoint(delta).await?;
            println!("heat setpoint set to {sent}");
            Ok(())
        }
        Command::Blower => print_json(&session.refresh_blower().await?.to_value()),
        Command::Heatpump => print_json(&session.refresh_heat_pump().await?.to_value()),
        Command::Settings => print_json(&session.thermostat_settings().await?),
        Command::Vacation(args) => {
            let config = VacationConfig::from(args);
            if config.is_empty() {
                let current = session.vacation().await?;
                print_json(&serde_json::to_value(current)?)
            } else {
                session.set_vacation(&config).await?;
                println!("vacation settings updated");
                Ok(())
            }
        }
    }
}

/// Follow the live channel and print each mirror as it changes.
async fn watch(session: &ThermostatSession, live_url: &str) -> Result<()> {
    let mut events = session.subscribe();
    let mut status = session.channel().status();
    session
        .initialize(live_url)
        .with_context(|| format!("Failed to open live channel at {live_url}"))?;

    // The channel pushes a snapshot eventually; a failed seed is not fatal
    if let Err(e) = session.refresh_state().await {
        warn!(error = %e, "initial state fetch failed");
    }

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for ctrl-c")?;
                info!("stopping watch");
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                eprintln!("channel: {current:?}");
                if matches!(current, ChannelStatus::Closed | ChannelStatus::GaveUp) {
                    break;
                }
            }
            event = events.recv() => match event {
                Ok(SessionEvent::StateChanged { source, .. }) => print_mirror(session, source)?,
                Ok(SessionEvent::RequestFailed { operation, error }) => {
                    eprintln!("{operation} failed: {error}");
                }
                Ok(SessionEvent::MessageRejected { reason }) => eprintln!("rejected message: {reason}"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

fn print_mirror(session: &ThermostatSession, source: Source) -> Result<()> {
    let value = match source {
        Source::Tstat => {
            let tstat = session.tstat();
            println!("{}", summary(&tstat));
            tstat.to_value()
        }
        Source::Blower => session.blower().to_value(),
        Source::HeatPump => session.heat_pump().to_value(),
    };
    println!("{source} {}", serde_json::to_string(&value)?);
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// One-line human summary of the thermostat mirror.
fn summary(tstat: &ThermostatState) -> String {
    let unit = tstat.temp_unit().unwrap_or("");
    let hold = match tstat.hold() {
        Some(true) => "on",
        Some(false) => "off",
        None => "-",
    };
    format!(
        "{}{unit} humidity {}% | mode {} fan {} | heat {} cool {} | hold {hold}",
        or_dash(tstat.current_temp()),
        or_dash(tstat.current_humidity()),
        or_dash(tstat.mode()),
        or_dash(tstat.fan_mode()),
        or_dash(tstat.heat_setpoint()),
        or_dash(tstat.cool_setpoint()),
    )
}
