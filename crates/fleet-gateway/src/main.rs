//! # fleet-gateway
//!
//! Fleet gateway binary: loads settings, installs logging, and serves the
//! HTTP surface in front of the upstream fleet API.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fleet_server::{FleetServer, ServerConfig};
use fleet_settings::{GatewaySettings, LayeredSettings, RejectedOverride};
use fleet_upstream::{ProxyDispatcher, UpstreamConfig};

/// Fleet gateway server.
#[derive(Parser, Debug)]
#[command(name = "fleet-gateway", about = "Session-managing gateway for the fleet API")]
struct Cli {
    /// Settings file (default: `$FLEET_GATEWAY_CONFIG` or `~/.fleet-gateway/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings, 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Upstream API base URL (overrides settings).
    #[arg(long)]
    upstream_url: Option<String>,
}

impl Cli {
    fn settings_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(fleet_settings::settings_path)
    }

    /// Apply flags on top of file and environment layers.
    fn apply_overrides(&self, settings: &mut GatewaySettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(url) = &self.upstream_url {
            settings.upstream.base_url.clone_from(url);
        }
    }
}

/// Put the CLI layer on top and validate the final result once.
fn resolve(cli: &Cli, layered: LayeredSettings) -> Result<(GatewaySettings, Vec<RejectedOverride>)> {
    let LayeredSettings {
        mut settings,
        rejected,
    } = layered;
    cli.apply_overrides(&mut settings);
    settings.validate().context("Invalid settings")?;
    Ok((settings, rejected))
}

fn load(cli: &Cli) -> Result<(GatewaySettings, Vec<RejectedOverride>)> {
    let path = cli.settings_path();
    let layered = fleet_settings::load_layers(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    resolve(cli, layered)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (settings, rejected) = load(&cli)?;

    let _ = fleet_logging::init_subscriber(&settings.logging);
    for skipped in &rejected {
        tracing::warn!(
            key = skipped.key,
            value = %skipped.value,
            reason = skipped.reason,
            "ignoring environment override"
        );
    }
    tracing::info!(
        upstream = %settings.upstream.base_url,
        rovers = settings.rovers.len(),
        "starting fleet gateway"
    );

    let dispatcher = ProxyDispatcher::new(UpstreamConfig::from_settings(&settings))
        .context("Failed to build upstream client")?;

    let config = ServerConfig::from_settings(&settings);
    let shutdown_timeout = config.shutdown_timeout();
    let server = FleetServer::new(config, Arc::new(dispatcher));

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("fleet gateway listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("shutting down");
    if !server
        .shutdown()
        .graceful_shutdown(vec![handle], shutdown_timeout)
        .await
    {
        tracing::warn!("in-flight requests were cut off");
    }

    tracing::info!("shutdown complete");
    Ok(())
}
