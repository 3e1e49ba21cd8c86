//! Settings loading: defaults, then file, then environment.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per key)
//! - Arrays and primitives are replaced by the source
//! - Null values in the source are skipped

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::Result;
use crate::types::{GatewaySettings, LogFormat, LogLevel};

/// Env var naming an explicit settings file.
pub const CONFIG_PATH_ENV: &str = "FLEET_GATEWAY_CONFIG";

/// Resolve the settings file path.
///
/// `$FLEET_GATEWAY_CONFIG` wins; otherwise `~/.fleet-gateway/settings.json`.
pub fn settings_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home)
        .join(".fleet-gateway")
        .join("settings.json")
}

/// An environment override that was set but could not be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedOverride {
    /// Variable name.
    pub key: &'static str,
    /// Raw value as found.
    pub value: String,
    /// Why it was skipped.
    pub reason: &'static str,
}

/// Defaults, file and environment layers, not yet validated.
///
/// Callers apply any higher-priority layer (CLI flags) and then call
/// [`GatewaySettings::validate`].
#[derive(Clone, Debug)]
pub struct LayeredSettings {
    /// Merged settings.
    pub settings: GatewaySettings,
    /// Environment overrides that were skipped, for logging once a
    /// subscriber is installed.
    pub rejected: Vec<RejectedOverride>,
}

/// Read the file at `path` over the defaults, then apply `FLEET_*` env vars.
///
/// A missing file yields the defaults. Unreadable or malformed files are errors.
pub fn load_layers(path: &Path) -> Result<LayeredSettings> {
    let mut settings = read_file_layer(path)?;
    let rejected = apply_env_overrides(&mut settings);
    Ok(LayeredSettings { settings, rejected })
}

fn read_file_layer(path: &Path) -> Result<GatewaySettings> {
    let defaults = serde_json::to_value(GatewaySettings::default())?;
    let merged = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        defaults
    };
    Ok(serde_json::from_value(merged)?)
}

/// Recursively merge `source` over `target`.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut into), Value::Object(from)) => {
            for (key, value) in from {
                if value.is_null() {
                    continue;
                }
                let merged = match into.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                let _ = into.insert(key, merged);
            }
            Value::Object(into)
        }
        (_, source) => source,
    }
}

/// Apply `FLEET_*` environment variables to `settings`.
pub fn apply_env_overrides(settings: &mut GatewaySettings) -> Vec<RejectedOverride> {
    apply_overrides(settings, |name| std::env::var(name).ok())
}

/// Apply overrides from an arbitrary variable source.
///
/// Empty values are treated as unset. Values that fail to parse are skipped,
/// leaving the file or default value in place, and returned.
pub fn apply_overrides<F>(settings: &mut GatewaySettings, lookup: F) -> Vec<RejectedOverride>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let mut rejected = Vec::new();
    let mut reject = |key: &'static str, value: String, reason: &'static str| {
        rejected.push(RejectedOverride { key, value, reason });
    };

    if let Some(v) = get("FLEET_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = get("FLEET_PORT") {
        match parse_u16_range(&v, 1, u16::MAX) {
            Some(port) => settings.server.port = port,
            None => reject("FLEET_PORT", v, "invalid port"),
        }
    }
    if let Some(v) = get("FLEET_UPSTREAM_URL") {
        settings.upstream.base_url = v;
    }
    if let Some(v) = get("FLEET_REQUEST_TIMEOUT_MS") {
        match parse_u64_range(&v, 100, 600_000) {
            Some(ms) => settings.upstream.request_timeout_ms = ms,
            None => reject("FLEET_REQUEST_TIMEOUT_MS", v, "invalid timeout"),
        }
    }
    if let Some(v) = get("FLEET_CONNECT_TIMEOUT_MS") {
        match parse_u64_range(&v, 100, 600_000) {
            Some(ms) => settings.upstream.connect_timeout_ms = ms,
            None => reject("FLEET_CONNECT_TIMEOUT_MS", v, "invalid timeout"),
        }
    }
    if let Some(v) = get("FLEET_ROVERS") {
        match parse_rover_list(&v) {
            Some(rovers) => settings.rovers = rovers,
            None => reject("FLEET_ROVERS", v, "empty rover list"),
        }
    }
    if let Some(v) = get("FLEET_LOG_LEVEL") {
        match LogLevel::parse(&v) {
            Some(level) => settings.logging.level = level,
            None => reject("FLEET_LOG_LEVEL", v, "unknown log level"),
        }
    }
    if let Some(v) = get("FLEET_LOG_FORMAT") {
        match LogFormat::parse(&v) {
            Some(format) => settings.logging.format = format,
            None => reject("FLEET_LOG_FORMAT", v, "unknown log format"),
        }
    }
    rejected
}

/// Parse a string as a `u16` within `min..=max`.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u64` within `min..=max`.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Split a comma-separated rover list, dropping blanks. `None` if nothing remains.
pub fn parse_rover_list(val: &str) -> Option<Vec<String>> {
    let rovers: Vec<String> = val
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect();
    (!rovers.is_empty()).then_some(rovers)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::errors::SettingsError;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_objects() {
        let target = serde_json::json!({"server": {"port": 8000, "host": "0.0.0.0"}});
        let source = serde_json::json!({"server": {"port": 9000}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["server"]["port"], 9000);
        assert_eq!(merged["server"]["host"], "0.0.0.0");
    }

    #[test]
    fn merge_replaces_arrays() {
        let target = serde_json::json!({"rovers": ["Rover-1", "Rover-2"]});
        let source = serde_json::json!({"rovers": ["Scout"]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["rovers"], serde_json::json!(["Scout"]));
    }

    #[test]
    fn merge_skips_nulls() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"a": null, "b": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    // ── load_layers ─────────────────────────────────────────────────

    #[test]
    fn missing_file_gives_defaults() {
        let layered = load_layers(Path::new("/nonexistent/fleet.json")).unwrap();
        assert_eq!(layered.settings.server.port, GatewaySettings::default().server.port);
    }

    #[test]
    fn partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"upstream": {"baseUrl": "http://localhost:4000/api"}, "rovers": ["A", "B"]}"#,
        )
        .unwrap();

        let settings = load_layers(&path).unwrap().settings;
        assert_eq!(settings.upstream.base_url, "http://localhost:4000/api");
        assert_eq!(settings.upstream.request_timeout_ms, 8000);
        assert_eq!(settings.rovers, vec!["A", "B"]);
    }

    #[test]
    fn malformed_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_layers(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn layers_are_returned_unvalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"upstream": {"baseUrl": "ftp://broken.example"}}"#).unwrap();

        let mut layered = load_layers(&path).unwrap();
        assert!(matches!(
            layered.settings.validate(),
            Err(SettingsError::InvalidValue(_))
        ));

        layered.settings.upstream.base_url = "http://good.example/api".into();
        assert!(layered.settings.validate().is_ok());
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn overrides_apply_valid_values() {
        let mut settings = GatewaySettings::default();
        let rejected = apply_overrides(
            &mut settings,
            lookup_from(&[
                ("FLEET_HOST", "127.0.0.1"),
                ("FLEET_PORT", "9090"),
                ("FLEET_UPSTREAM_URL", "http://upstream.test/api"),
                ("FLEET_REQUEST_TIMEOUT_MS", "2500"),
                ("FLEET_ROVERS", "Rover-7, Rover-8 ,,"),
                ("FLEET_LOG_LEVEL", "debug"),
                ("FLEET_LOG_FORMAT", "json"),
            ]),
        );
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.upstream.base_url, "http://upstream.test/api");
        assert_eq!(settings.upstream.request_timeout_ms, 2500);
        assert_eq!(settings.rovers, vec!["Rover-7", "Rover-8"]);
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert!(rejected.is_empty());
    }

    #[test]
    fn overrides_ignore_invalid_values() {
        let mut settings = GatewaySettings::default();
        let rejected = apply_overrides(
            &mut settings,
            lookup_from(&[
                ("FLEET_PORT", "0"),
                ("FLEET_REQUEST_TIMEOUT_MS", "fast"),
                ("FLEET_ROVERS", " , "),
                ("FLEET_LOG_LEVEL", "chatty"),
                ("FLEET_HOST", ""),
            ]),
        );
        let defaults = GatewaySettings::default();
        assert_eq!(settings.server.port, defaults.server.port);
        assert_eq!(settings.server.host, defaults.server.host);
        assert_eq!(
            settings.upstream.request_timeout_ms,
            defaults.upstream.request_timeout_ms
        );
        assert_eq!(settings.rovers, defaults.rovers);
        assert_eq!(settings.logging.level, defaults.logging.level);

        let keys: Vec<&str> = rejected.iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            vec!["FLEET_PORT", "FLEET_REQUEST_TIMEOUT_MS", "FLEET_ROVERS", "FLEET_LOG_LEVEL"]
        );
        assert_eq!(rejected[0].value, "0");
        assert_eq!(rejected[0].reason, "invalid port");
    }

    #[test]
    fn range_parsers() {
        assert_eq!(parse_u16_range("8080", 1, u16::MAX), Some(8080));
        assert_eq!(parse_u16_range("0", 1, u16::MAX), None);
        assert_eq!(parse_u16_range("70000", 1, u16::MAX), None);
        assert_eq!(parse_u64_range(" 100 ", 100, 200), Some(100));
        assert_eq!(parse_u64_range("99", 100, 200), None);
    }

    #[test]
    fn rover_list_parser() {
        assert_eq!(
            parse_rover_list("Rover-1,Rover-2"),
            Some(vec!["Rover-1".to_string(), "Rover-2".to_string()])
        );
        assert_eq!(parse_rover_list(" ,, "), None);
    }
}
