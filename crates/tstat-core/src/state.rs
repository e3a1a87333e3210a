//! Client-side mirrors of server-authoritative state.
//!
//! A mirror holds the raw JSON object last received for its source. It is
//! replaced wholesale on every update and never merged, so fields missing
//! from a snapshot disappear from the mirror. Fields this client does not
//! know about are kept and passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::modes::{FanMode, Mode};

/// A snapshot that cannot become a mirror.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
    /// Mirrors hold JSON objects only.
    #[error("expected a JSON object, got {found}")]
    NotAnObject {
        /// JSON type that was received instead.
        found: &'static str,
    },
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

macro_rules! mirror {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Map<String, Value>);

        impl $name {
            /// Build a mirror from a snapshot document.
            pub fn from_value(value: Value) -> Result<Self, MirrorError> {
                match value {
                    Value::Object(map) => Ok(Self(map)),
                    other => Err(MirrorError::NotAnObject {
                        found: json_type(&other),
                    }),
                }
            }

            /// Raw field lookup.
            pub fn get(&self, key: &str) -> Option<&Value> {
                self.0.get(key)
            }

            /// Whether no snapshot has been received yet (or it was empty).
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Borrow the underlying document.
            pub fn as_map(&self) -> &Map<String, Value> {
                &self.0
            }

            /// The mirror as a JSON value, exactly as it was received.
            pub fn to_value(&self) -> Value {
                Value::Object(self.0.clone())
            }

            #[allow(dead_code)]
            fn u64_field(&self, key: &str) -> Option<u64> {
                self.0.get(key).and_then(Value::as_u64)
            }

            #[allow(dead_code)]
            fn f64_field(&self, key: &str) -> Option<f64> {
                self.0.get(key).and_then(Value::as_f64)
            }

            #[allow(dead_code)]
            fn str_field(&self, key: &str) -> Option<&str> {
                self.0.get(key).and_then(Value::as_str)
            }
        }
    };
}

mirror!(
    /// Mirror of the `tstat` source: zone configuration plus current readings.
    ThermostatState
);

mirror!(
    /// Mirror of the `blower` source: air handler readings.
    BlowerState
);

mirror!(
    /// Mirror of the `heatpump` source: outdoor unit readings.
    HeatPumpState
);

impl ThermostatState {
    /// Target cooling temperature.
    pub fn cool_setpoint(&self) -> Option<f64> {
        self.f64_field("coolSetpoint")
    }

    /// Target heating temperature.
    pub fn heat_setpoint(&self) -> Option<f64> {
        self.f64_field("heatSetpoint")
    }

    /// Fan mode, if present and recognized.
    pub fn fan_mode(&self) -> Option<FanMode> {
        self.str_field("fanMode").and_then(|s| s.parse().ok())
    }

    /// Operating mode, if present and recognized.
    pub fn mode(&self) -> Option<Mode> {
        self.str_field("mode").and_then(|s| s.parse().ok())
    }

    /// Whether the zone's schedule is held.
    pub fn hold(&self) -> Option<bool> {
        self.0.get("hold").and_then(Value::as_bool)
    }

    /// Indoor temperature reading.
    pub fn current_temp(&self) -> Option<f64> {
        self.f64_field("currentTemp")
    }

    /// Indoor relative humidity reading.
    pub fn current_humidity(&self) -> Option<f64> {
        self.f64_field("currentHumidity")
    }

    /// Outdoor temperature reading.
    pub fn outdoor_temp(&self) -> Option<f64> {
        self.f64_field("outdoorTemp")
    }

    /// Active heating/cooling stage.
    pub fn stage(&self) -> Option<u64> {
        self.u64_field("stage")
    }

    /// Temperature unit reported by the backend.
    pub fn temp_unit(&self) -> Option<&str> {
        self.str_field("tempUnit")
    }

    /// `key + delta`, computed from the cached value.
    ///
    /// Integral values stay integral so the request body carries `72`, not
    /// `72.0`. Returns `None` when the field is absent or not a number.
    pub fn offset_setpoint(&self, key: &str, delta: i64) -> Option<Value> {
        let current = self.0.get(key)?;
        if let Some(n) = current.as_i64() {
            return Some(Value::from(n.saturating_add(delta)));
        }
        #[allow(clippy::cast_precision_loss)]
        current.as_f64().map(|f| Value::from(f + delta as f64))
    }
}

impl BlowerState {
    /// Blower motor speed.
    pub fn blower_rpm(&self) -> Option<u64> {
        self.u64_field("blowerRPM")
    }

    /// Air flow in cubic feet per minute.
    pub fn air_flow_cfm(&self) -> Option<u64> {
        self.u64_field("airFlowCFM")
    }

    /// Whether electric heat strips are engaged.
    pub fn elec_heat(&self) -> Option<bool> {
        self.0.get("elecHeat").and_then(Value::as_bool)
    }
}

impl HeatPumpState {
    /// Outdoor coil temperature.
    pub fn coil_temp(&self) -> Option<f64> {
        self.f64_field("coilTemp")
    }

    /// Outdoor air temperature measured at the heat pump.
    pub fn outside_temp(&self) -> Option<f64> {
        self.f64_field("outsideTemp")
    }

    /// Compressor stage.
    pub fn stage(&self) -> Option<u64> {
        self.u64_field("stage")
    }

    /// Temperature unit reported by the backend.
    pub fn temp_unit(&self) -> Option<&str> {
        self.str_field("tempUnit")
    }
}
