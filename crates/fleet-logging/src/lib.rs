//! # fleet-logging
//!
//! Structured logging with `tracing`.
//!
//! `RUST_LOG` wins over the configured level. Noisy HTTP client internals
//! are held at `warn` unless `RUST_LOG` says otherwise.

#![deny(unsafe_code)]

use fleet_settings::{LogFormat, LoggingSettings};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Crates whose debug output drowns out the gateway's own.
const QUIET_TARGETS: [&str; 4] = ["hyper", "hyper_util", "reqwest", "h2"];

/// Build the filter directive string for a configured level.
pub fn filter_directives(settings: &LoggingSettings) -> String {
    let mut directives = settings.level.as_filter_str().to_string();
    for target in QUIET_TARGETS {
        directives.push_str(&format!(",{target}=warn"));
    }
    directives
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (e.g. by an
/// earlier test), in which case the existing one is left alone.
pub fn init_subscriber(settings: &LoggingSettings) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(settings)));

    let fmt_layer = match settings.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter))
        .try_init()
        .is_ok()
}
