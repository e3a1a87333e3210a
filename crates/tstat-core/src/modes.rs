//! Fan and operating modes accepted by the configuration API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fan speed setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    /// Fan runs only while heating or cooling.
    Auto,
    /// Continuous low speed.
    Low,
    /// Continuous medium speed.
    Med,
    /// Continuous high speed.
    High,
}

/// Thermostat operating mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Heating only.
    Heat,
    /// Cooling only.
    Cool,
    /// Switch between heating and cooling as needed.
    Auto,
    /// System off.
    Off,
}

/// A mode string that is not one of the accepted values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

impl FanMode {
    /// All fan modes, in display order.
    pub const ALL: [Self; 4] = [Self::Auto, Self::Low, Self::Med, Self::High];

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Low => "low",
            Self::Med => "med",
            Self::High => "high",
        }
    }
}

impl Mode {
    /// All operating modes, in display order.
    pub const ALL: [Self; 4] = [Self::Heat, Self::Cool, Self::Auto, Self::Off];

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::Auto => "auto",
            Self::Off => "off",
        }
    }
}

impl FromStr for FanMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseModeError {
                kind: "fan mode",
                value: s.to_string(),
            })
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseModeError {
                kind: "mode",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
