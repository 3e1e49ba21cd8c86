//! # fleet-upstream
//!
//! Client side of the fleet gateway: owns the upstream session token,
//! forwards resource requests, recovers from expired sessions, and builds
//! the whole-fleet aggregate.
//!
//! The HTTP surface depends only on the [`FleetApi`] trait;
//! [`ProxyDispatcher`] is the implementation that talks to the real
//! upstream.

#![deny(unsafe_code)]

pub mod aggregate;
pub mod api;
pub mod dispatcher;
pub mod errors;
pub mod expiry;
pub mod resource;
pub mod session;

pub use aggregate::{AllRoverData, RoverDataMap, RoverRecord};
pub use api::FleetApi;
pub use dispatcher::{ProxyDispatcher, UpstreamConfig};
pub use errors::ProxyError;
pub use resource::{ResourceKind, ResourceRequest, RoverId};
pub use session::SessionManager;
