//! The operations the HTTP surface needs from the upstream side.

use async_trait::async_trait;
use serde_json::Value;

use crate::aggregate::AllRoverData;
use crate::errors::ProxyError;
use crate::resource::RoverId;

/// Fleet telemetry queries. [`ProxyDispatcher`](crate::ProxyDispatcher) is
/// the production implementation.
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// Upstream `/fleet/status` payload.
    async fn fleet_status(&self) -> Result<Value, ProxyError>;
    /// Upstream `/rover/{id}/status` payload.
    async fn rover_status(&self, rover: RoverId) -> Result<Value, ProxyError>;
    /// Upstream `/rover/{id}/sensor-data` payload.
    async fn sensor_data(&self, rover: RoverId) -> Result<Value, ProxyError>;
    /// Upstream `/rover/{id}/battery` payload.
    async fn battery_level(&self, rover: RoverId) -> Result<Value, ProxyError>;
    /// Upstream `/rover/{id}/coordinates` payload.
    async fn coordinates(&self, rover: RoverId) -> Result<Value, ProxyError>;
    /// Fleet status plus every configured rover's telemetry.
    async fn fetch_all_rover_data(&self) -> Result<AllRoverData, ProxyError>;
}
