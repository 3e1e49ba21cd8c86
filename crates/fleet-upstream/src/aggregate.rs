//! Aggregate view of the whole fleet.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::errors::ProxyError;
use crate::resource::RoverId;

/// Per-rover telemetry, or a degraded placeholder when a fetch failed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoverRecord {
    /// Why this record is degraded; absent for healthy records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Upstream `/rover/{id}/status` payload.
    pub status: Value,
    /// Upstream `/rover/{id}/sensor-data` payload.
    pub sensor_data: Value,
    /// Upstream `/rover/{id}/battery` payload.
    pub battery: Value,
    /// Upstream `/rover/{id}/coordinates` payload.
    pub coordinates: Value,
}

impl RoverRecord {
    /// Placeholder used when any of a rover's fetches fails.
    pub fn degraded(error: &ProxyError) -> Self {
        Self {
            error: Some(error.to_string()),
            status: json!({"operational": false, "state": "error"}),
            sensor_data: json!({}),
            battery: json!({"level": 0, "percentage": 0, "charging": false}),
            coordinates: json!({"x": 0, "y": 0}),
        }
    }

    /// Whether this record stands in for failed fetches.
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Rover records keyed by identifier, serialized in fetch order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoverDataMap(Vec<(RoverId, RoverRecord)>);

impl RoverDataMap {
    /// Append a record. Callers visit each rover once.
    pub fn push(&mut self, rover: RoverId, record: RoverRecord) {
        self.0.push((rover, record));
    }

    /// Look up a rover's record.
    pub fn get(&self, rover: &str) -> Option<&RoverRecord> {
        self.0
            .iter()
            .find(|(id, _)| id.as_str() == rover)
            .map(|(_, record)| record)
    }

    /// Number of rovers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no rovers were visited.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in fetch order.
    pub fn iter(&self) -> impl Iterator<Item = (&RoverId, &RoverRecord)> {
        self.0.iter().map(|(id, record)| (id, record))
    }
}

impl Serialize for RoverDataMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, record) in &self.0 {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

/// Result of `fetch_all_rover_data`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllRoverData {
    /// Upstream `/fleet/status` payload.
    pub fleet_status: Value,
    /// Per-rover records.
    pub rover_data: RoverDataMap,
}
