//! `GET /` liveness marker.

use serde::Serialize;

/// Liveness response body.
#[derive(Debug, Clone, Serialize)]
pub struct LivenessResponse {
    /// Always `"success"` while the process is serving.
    pub status: &'static str,
    /// Fixed human-readable marker.
    pub message: &'static str,
}

/// Build the liveness body. Never touches the upstream.
pub fn liveness() -> LivenessResponse {
    LivenessResponse {
        status: "success",
        message: "Fleet API middleware server is running",
    }
}
