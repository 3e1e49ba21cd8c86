//! # fleet-server
//!
//! Axum HTTP surface for the fleet gateway.
//!
//! - `/api/...` routes forwarding to a [`fleet_upstream::FleetApi`]
//! - `{status, data}` success envelope and `{status, detail}` error body
//! - `GET /` liveness marker
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod response;
pub mod routes;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use server::{AppState, FleetServer};
pub use shutdown::ShutdownCoordinator;
