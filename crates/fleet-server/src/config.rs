//! Server configuration.

use std::time::Duration;

use fleet_settings::GatewaySettings;
use serde::{Deserialize, Serialize};

/// Configuration for the gateway's HTTP listener.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `8000`, `0` for auto-assign).
    pub port: u16,
    /// How long shutdown waits for in-flight requests.
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Extract the server section of the gateway settings.
    pub fn from_settings(settings: &GatewaySettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            shutdown_timeout_secs: settings.server.shutdown_timeout_secs,
        }
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Shutdown drain timeout.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            shutdown_timeout_secs: 10,
        }
    }
}
