//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TstatSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::TstatSettings;

/// Resolve the path to the settings file (`~/.tstat/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".tstat").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<TstatSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, defaults are used. Invalid JSON or an invalid
/// final value is an error.
pub fn load_settings_from_path(path: &Path) -> Result<TstatSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Defaults with the file at `path` merged over them. No env overrides.
pub fn read_settings_file(path: &Path) -> Result<TstatSettings> {
    let defaults = serde_json::to_value(TstatSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are logged and ignored (the file/default value stays).
pub fn apply_env_overrides(settings: &mut TstatSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable lookup.
///
/// Split out from [`apply_env_overrides`] so tests can supply variables
/// without touching the process environment.
pub fn apply_overrides(settings: &mut TstatSettings, lookup: impl Fn(&str) -> Option<String>) {
    let string = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let number = |name: &str, min: u64, max: u64| {
        let val = lookup(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid numeric env var, ignoring");
        }
        result
    };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = string("TSTAT_URL") {
        settings.server.base_url = v;
    }
    if let Some(v) = string("TSTAT_WS_URL") {
        settings.server.ws_url = Some(v);
    }
    if let Some(v) = number("TSTAT_ZONE", 1, 8) {
        #[allow(clippy::cast_possible_truncation)]
        let zone = v as u8;
        settings.zone = zone;
    }

    // ── HTTP ────────────────────────────────────────────────────────
    if let Some(v) = number("TSTAT_HTTP_TIMEOUT_MS", 100, 600_000) {
        settings.http.timeout_ms = v;
    }

    // ── Reconnect ───────────────────────────────────────────────────
    if let Some(v) = number("TSTAT_RECONNECT_BASE_MS", 1, 600_000) {
        settings.reconnect.base_delay_ms = v;
    }
    if let Some(v) = number("TSTAT_RECONNECT_MAX_MS", 1, 3_600_000) {
        settings.reconnect.max_delay_ms = v;
    }
    if let Some(v) = number("TSTAT_RECONNECT_MAX_ATTEMPTS", 0, u64::from(u32::MAX)) {
        #[allow(clippy::cast_possible_truncation)]
        let attempts = v as u32;
        settings.reconnect.max_attempts = Some(attempts);
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = string("TSTAT_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = lookup("TSTAT_LOG_JSON") {
        match parse_bool(&v) {
            Some(b) => settings.logging.json = b,
            None => tracing::warn!(key = "TSTAT_LOG_JSON", value = %v, "invalid boolean env var, ignoring"),
        }
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}
