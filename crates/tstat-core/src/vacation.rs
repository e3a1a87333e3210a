//! Vacation hold parameters.

use serde::{Deserialize, Deserializer, Serialize};

use crate::modes::FanMode;

/// Vacation settings for the thermostat.
///
/// Every field is optional. On a write only the fields that are set are sent,
/// and the backend leaves the others unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationConfig {
    /// Whether vacation mode is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Length of the vacation in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u8>,
    /// Lowest temperature to allow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temperature: Option<u8>,
    /// Highest temperature to allow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<u8>,
    /// Lowest relative humidity to allow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_humidity: Option<u8>,
    /// Highest relative humidity to allow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_humidity: Option<u8>,
    /// Fan mode while on vacation. A mode the client does not know (the
    /// backend reports `"unknown"` for raw values it cannot name) reads as
    /// `None`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_fan_mode"
    )]
    pub fan_mode: Option<FanMode>,
}

impl VacationConfig {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn lenient_fan_mode<'de, D>(deserializer: D) -> Result<Option<FanMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|mode| mode.parse().ok()))
}
