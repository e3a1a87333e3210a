//! Frames pushed by the backend over the live channel.
//!
//! Every frame is a JSON object `{ "source": string, "data": object }`. The
//! `source` tag names the backend cache entry that changed; `data` is the full
//! snapshot of that entry.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cache entries the backend broadcasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Thermostat zone configuration and readings.
    Tstat,
    /// Air handler (blower) readings.
    Blower,
    /// Outdoor heat pump readings.
    #[serde(rename = "heatpump")]
    HeatPump,
}

impl Source {
    /// Wire tag for this source.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tstat => "tstat",
            Self::Blower => "blower",
            Self::HeatPump => "heatpump",
        }
    }

    /// Resolve a wire tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "tstat" => Some(Self::Tstat),
            "blower" => Some(Self::Blower),
            "heatpump" => Some(Self::HeatPump),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded live channel frame.
///
/// `source` is kept as the raw string so frames from sources this client does
/// not know about still decode; the session decides what to do with them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Discriminator naming the backend cache entry.
    pub source: String,
    /// Snapshot replacing the matching mirror.
    pub data: Value,
}

impl InboundMessage {
    /// Decode a frame that has already been parsed as JSON.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The known source this frame targets, if any.
    pub fn source_kind(&self) -> Option<Source> {
        Source::from_tag(&self.source)
    }
}
