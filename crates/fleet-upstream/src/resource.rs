//! Resource model: which upstream endpoint a request maps to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-supplied rover identifier.
///
/// Not validated against the upstream; any value is forwarded as one
/// (percent-encoded) path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoverId(String);

impl RoverId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as sent upstream.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RoverId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RoverId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The five telemetry resources the upstream serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Whole-fleet status.
    FleetStatus,
    /// One rover's status.
    RoverStatus,
    /// One rover's sensor readings.
    SensorData,
    /// One rover's battery level.
    Battery,
    /// One rover's position.
    Coordinates,
}

impl ResourceKind {
    /// Short name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FleetStatus => "fleet_status",
            Self::RoverStatus => "rover_status",
            Self::SensorData => "sensor_data",
            Self::Battery => "battery",
            Self::Coordinates => "coordinates",
        }
    }

    /// Trailing path segment of the upstream endpoint.
    fn leaf(self) -> &'static str {
        match self {
            Self::FleetStatus | Self::RoverStatus => "status",
            Self::SensorData => "sensor-data",
            Self::Battery => "battery",
            Self::Coordinates => "coordinates",
        }
    }
}

/// A (resource kind, rover) pair naming exactly one upstream endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRequest {
    kind: ResourceKind,
    rover: Option<RoverId>,
}

impl ResourceRequest {
    /// `GET /fleet/status`
    pub fn fleet_status() -> Self {
        Self {
            kind: ResourceKind::FleetStatus,
            rover: None,
        }
    }

    /// `GET /rover/{id}/status`
    pub fn rover_status(rover: RoverId) -> Self {
        Self::for_rover(ResourceKind::RoverStatus, rover)
    }

    /// `GET /rover/{id}/sensor-data`
    pub fn sensor_data(rover: RoverId) -> Self {
        Self::for_rover(ResourceKind::SensorData, rover)
    }

    /// `GET /rover/{id}/battery`
    pub fn battery(rover: RoverId) -> Self {
        Self::for_rover(ResourceKind::Battery, rover)
    }

    /// `GET /rover/{id}/coordinates`
    pub fn coordinates(rover: RoverId) -> Self {
        Self::for_rover(ResourceKind::Coordinates, rover)
    }

    fn for_rover(kind: ResourceKind, rover: RoverId) -> Self {
        Self {
            kind,
            rover: Some(rover),
        }
    }

    /// Resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Unencoded path segments below the upstream base URL.
    pub fn path_segments(&self) -> Vec<&str> {
        match &self.rover {
            None => vec!["fleet", self.kind.leaf()],
            Some(rover) => vec!["rover", rover.as_str(), self.kind.leaf()],
        }
    }
}

impl fmt::Display for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_segments().join("/"))
    }
}
