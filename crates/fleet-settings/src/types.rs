//! Settings type definitions.
//!
//! Field names are camelCase on the wire. Every section is `#[serde(default)]`
//! so a settings file only needs the keys it changes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{Result, SettingsError};

/// Upstream base URL of the reference fleet deployment.
pub const DEFAULT_UPSTREAM_URL: &str = "https://fleetbots-production.up.railway.app/api";

/// Rovers known to the reference deployment.
pub const DEFAULT_ROVERS: [&str; 5] = ["Rover-1", "Rover-2", "Rover-3", "Rover-4", "Rover-5"];

/// Root settings type for the gateway.
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "upstream": { "baseUrl": "http://localhost:4000/api" },
///   "rovers": ["Rover-1", "Rover-2"]
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewaySettings {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Upstream fleet API settings.
    pub upstream: UpstreamSettings,
    /// Rover identifiers visited by the aggregate endpoint, in order.
    pub rovers: Vec<String>,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            upstream: UpstreamSettings::default(),
            rovers: DEFAULT_ROVERS.iter().map(|r| (*r).to_string()).collect(),
            logging: LoggingSettings::default(),
        }
    }
}

impl GatewaySettings {
    /// Reject settings the gateway cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.rovers.is_empty() {
            return Err(SettingsError::InvalidValue(
                "rovers must contain at least one identifier".into(),
            ));
        }
        if self.rovers.iter().any(|r| r.trim().is_empty()) {
            return Err(SettingsError::InvalidValue(
                "rover identifiers must not be blank".into(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.rovers.iter().find(|r| !seen.insert(r.as_str())) {
            return Err(SettingsError::InvalidValue(format!(
                "rover identifier listed twice: {dup:?}"
            )));
        }
        validate_base_url(&self.upstream.base_url)?;
        if self.upstream.request_timeout_ms == 0 || self.upstream.connect_timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "upstream timeouts must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// The upstream base URL must parse, be http(s), and take path segments.
fn validate_base_url(raw: &str) -> Result<()> {
    let parsed = Url::parse(raw).map_err(|e| {
        SettingsError::InvalidValue(format!("upstream.baseUrl does not parse ({e}): {raw:?}"))
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SettingsError::InvalidValue(format!(
                "upstream.baseUrl must be an http(s) URL, got scheme {other:?}"
            )));
        }
    }
    if parsed.host_str().is_none_or(str::is_empty) || parsed.cannot_be_a_base() {
        return Err(SettingsError::InvalidValue(format!(
            "upstream.baseUrl has no host: {raw:?}"
        )));
    }
    Ok(())
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// How long to wait for in-flight requests on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            shutdown_timeout_secs: 10,
        }
    }
}

/// Upstream fleet API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamSettings {
    /// Base URL every upstream path is appended to.
    pub base_url: String,
    /// Whole-request timeout for one upstream call.
    pub request_timeout_ms: u64,
    /// TCP/TLS connect timeout.
    pub connect_timeout_ms: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            request_timeout_ms: 8000,
            connect_timeout_ms: 5000,
        }
    }
}

/// Log verbosity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level.
    Trace,
    /// Debug-level.
    Debug,
    /// Info-level.
    #[default]
    Info,
    /// Warning-level.
    Warn,
    /// Error-level.
    Error,
}

impl LogLevel {
    /// Convert to a `tracing` filter directive.
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parse a level name, case-insensitively.
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a format name, case-insensitively.
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level; `RUST_LOG` takes precedence.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
}
