//! # fleet-settings
//!
//! Layered configuration for the fleet gateway.
//!
//! Settings are resolved from three layers (lowest priority first):
//! 1. **Compiled defaults**: [`GatewaySettings::default()`]
//! 2. **Settings file**: JSON, deep-merged over the defaults
//! 3. **Environment variables**: `FLEET_*` overrides
//!
//! The binary applies its CLI flags on top of the result.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{LayeredSettings, RejectedOverride, deep_merge, load_layers, settings_path};
pub use types::*;
