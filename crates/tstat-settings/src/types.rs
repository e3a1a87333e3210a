//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a settings
//! file may contain any subset of fields.

use serde::{Deserialize, Serialize};
use tstat_core::ReconnectConfig;
use tstat_core::constants::{DEFAULT_ZONE, MAX_ZONE, WS_PATH};
use url::Url;

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "server": { "baseUrl": "http://thermostat.local:8080" },
///   "zone": 1,
///   "reconnect": { "maxAttempts": 20 }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TstatSettings {
    /// Backend location.
    pub server: ServerSettings,
    /// Zone addressed by configuration requests.
    pub zone: u8,
    /// HTTP request settings.
    pub http: HttpSettings,
    /// Live channel reconnect policy.
    pub reconnect: ReconnectConfig,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Where the backend lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Origin of the configuration API, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Live channel URL. Derived from `base_url` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_url: Option<String>,
}

/// HTTP client settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpSettings {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`) or a full
    /// `EnvFilter` directive.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TstatSettings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            zone: DEFAULT_ZONE,
            http: HttpSettings::default(),
            reconnect: ReconnectConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            ws_url: None,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl TstatSettings {
    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ZONE).contains(&self.zone) {
            return Err(SettingsError::InvalidValue(format!(
                "zone {} out of range 1-{MAX_ZONE}",
                self.zone
            )));
        }
        if self.http.timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "http.timeoutMs must be positive".to_string(),
            ));
        }
        let _ = self.server.api_base()?;
        let _ = self.server.live_url()?;
        Ok(())
    }
}

impl ServerSettings {
    /// The configuration API origin without a trailing slash.
    pub fn api_base(&self) -> Result<String> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            SettingsError::InvalidValue(format!("server.baseUrl '{}': {e}", self.base_url))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(self.base_url.trim_end_matches('/').to_string()),
            other => Err(SettingsError::InvalidValue(format!(
                "server.baseUrl scheme '{other}' is not http or https"
            ))),
        }
    }

    /// The live channel URL: `ws_url` if set, otherwise `ws(s)://{host}:{port}/api/ws`
    /// on the same origin as `base_url`.
    pub fn live_url(&self) -> Result<String> {
        if let Some(ws_url) = &self.ws_url {
            let url = Url::parse(ws_url).map_err(|e| {
                SettingsError::InvalidValue(format!("server.wsUrl '{ws_url}': {e}"))
            })?;
            return match url.scheme() {
                "ws" | "wss" => Ok(ws_url.clone()),
                other => Err(SettingsError::InvalidValue(format!(
                    "server.wsUrl scheme '{other}' is not ws or wss"
                ))),
            };
        }
        derive_live_url(&self.base_url)
    }
}

fn derive_live_url(base_url: &str) -> Result<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| SettingsError::InvalidValue(format!("server.baseUrl '{base_url}': {e}")))?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => {
            return Err(SettingsError::InvalidValue(format!(
                "server.baseUrl scheme '{other}' is not http or https"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| SettingsError::InvalidValue(format!("cannot use {scheme} for {base_url}")))?;
    url.set_path(WS_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_use_zone_one() {
        assert_eq!(TstatSettings::default().zone, DEFAULT_ZONE);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: TstatSettings =
            serde_json::from_str(r#"{"server": {"baseUrl": "http://hvac:9000"}}"#).unwrap();
        assert_eq!(settings.server.base_url, "http://hvac:9000");
        assert_eq!(settings.zone, 1);
        assert_eq!(settings.http.timeout_ms, 10_000);
    }

    #[test]
    fn live_url_derived_from_base() {
        let server = ServerSettings {
            base_url: "http://192.168.1.37:8080/".into(),
            ws_url: None,
        };
        assert_eq!(server.live_url().unwrap(), "ws://192.168.1.37:8080/api/ws");
    }

    #[test]
    fn live_url_uses_wss_for_https() {
        let server = ServerSettings {
            base_url: "https://hvac.example.com".into(),
            ws_url: None,
        };
        assert_eq!(server.live_url().unwrap(), "wss://hvac.example.com/api/ws");
    }

    #[test]
    fn explicit_ws_url_wins() {
        let server = ServerSettings {
            base_url: "http://localhost:8080".into(),
            ws_url: Some("ws://other:9999/live".into()),
        };
        assert_eq!(server.live_url().unwrap(), "ws://other:9999/live");
    }

    #[test]
    fn rejects_wrong_schemes() {
        let server = ServerSettings {
            base_url: "ftp://localhost".into(),
            ws_url: None,
        };
        assert_matches!(server.api_base(), Err(SettingsError::InvalidValue(_)));
        assert_matches!(server.live_url(), Err(SettingsError::InvalidValue(_)));

        let server = ServerSettings {
            base_url: "http://localhost".into(),
            ws_url: Some("http://localhost/api/ws".into()),
        };
        assert_matches!(server.live_url(), Err(SettingsError::InvalidValue(_)));
    }

    #[test]
    fn api_base_trims_trailing_slash() {
        let server = ServerSettings {
            base_url: "http://localhost:8080/".into(),
            ws_url: None,
        };
        assert_eq!(server.api_base().unwrap(), "http://localhost:8080");
    }

    #[test]
    fn validate_rejects_zone_out_of_range() {
        let settings = TstatSettings {
            zone: 9,
            ..TstatSettings::default()
        };
        assert_matches!(settings.validate(), Err(SettingsError::InvalidValue(_)));
        let settings = TstatSettings {
            zone: 0,
            ..TstatSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let settings = TstatSettings {
            http: HttpSettings { timeout_ms: 0 },
            ..TstatSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
