//! `/api` routes. Each handler forwards to the [`FleetApi`] and wraps the
//! result.

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;
use fleet_upstream::{AllRoverData, FleetApi, RoverId};
use serde_json::Value;

use crate::response::{ApiResult, success};
use crate::server::AppState;

/// Router for everything under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/fleet/status", get(fleet_status))
        .route("/api/rover/{id}/status", get(rover_status))
        .route("/api/rover/{id}/sensor-data", get(sensor_data))
        .route("/api/rover/{id}/battery", get(battery))
        .route("/api/rover/{id}/coordinates", get(coordinates))
        .route("/api/all-rover-data", get(all_rover_data))
}

/// GET /api/fleet/status
async fn fleet_status(State(state): State<AppState>) -> ApiResult<Value> {
    success(state.fleet.fleet_status().await?)
}

/// GET /api/rover/{id}/status
async fn rover_status(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    success(state.fleet.rover_status(RoverId::from(id)).await?)
}

/// GET /api/rover/{id}/sensor-data
async fn sensor_data(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    success(state.fleet.sensor_data(RoverId::from(id)).await?)
}

/// GET /api/rover/{id}/battery
async fn battery(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    success(state.fleet.battery_level(RoverId::from(id)).await?)
}

/// GET /api/rover/{id}/coordinates
async fn coordinates(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    success(state.fleet.coordinates(RoverId::from(id)).await?)
}

/// GET /api/all-rover-data
async fn all_rover_data(State(state): State<AppState>) -> ApiResult<AllRoverData> {
    success(state.fleet.fetch_all_rover_data().await?)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use fleet_upstream::{ProxyError, RoverDataMap, RoverRecord};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    /// Records which operation was called and with which rover.
    #[derive(Default)]
    struct StubFleet {
        calls: Mutex<Vec<String>>,
    }

    impl StubFleet {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FleetApi for StubFleet {
        async fn fleet_status(&self) -> Result<Value, ProxyError> {
            self.record("fleet_status".into());
            Ok(json!({"active": 5}))
        }

        async fn rover_status(&self, rover: RoverId) -> Result<Value, ProxyError> {
            self.record(format!("rover_status:{rover}"));
            if rover.as_str() == "ghost" {
                return Err(ProxyError::Upstream {
                    status: 404,
                    body: "Rover not found".into(),
                });
            }
            Ok(json!({"operational": true}))
        }

        async fn sensor_data(&self, rover: RoverId) -> Result<Value, ProxyError> {
            self.record(format!("sensor_data:{rover}"));
            Ok(json!({"temp": 21}))
        }

        async fn battery_level(&self, rover: RoverId) -> Result<Value, ProxyError> {
            self.record(format!("battery:{rover}"));
            Err(ProxyError::Transport {
                message: "operation timed out".into(),
                timed_out: true,
            })
        }

        async fn coordinates(&self, rover: RoverId) -> Result<Value, ProxyError> {
            self.record(format!("coordinates:{rover}"));
            Err(ProxyError::UpstreamUnavailable("connection refused".into()))
        }

        async fn fetch_all_rover_data(&self) -> Result<AllRoverData, ProxyError> {
            self.record("all".into());
            let mut rover_data = RoverDataMap::default();
            rover_data.push(
                RoverId::new("Rover-1"),
                RoverRecord::degraded(&ProxyError::Internal("stub".into())),
            );
            Ok(AllRoverData {
                fleet_status: json!({"active": 1}),
                rover_data,
            })
        }
    }

    fn app(stub: Arc<StubFleet>) -> Router {
        api_router().with_state(AppState { fleet: stub })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn fleet_status_is_enveloped() {
        let stub = Arc::new(StubFleet::default());
        let (status, body) = get_json(app(stub.clone()), "/api/fleet/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success", "data": {"active": 5}}));
        assert_eq!(stub.calls(), vec!["fleet_status"]);
    }

    #[tokio::test]
    async fn rover_routes_dispatch_to_matching_operation() {
        let stub = Arc::new(StubFleet::default());
        let (status, body) = get_json(app(stub.clone()), "/api/rover/Rover-2/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["operational"], true);

        let (status, body) = get_json(app(stub.clone()), "/api/rover/Rover-2/sensor-data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["temp"], 21);

        assert_eq!(stub.calls(), vec!["rover_status:Rover-2", "sensor_data:Rover-2"]);
    }

    #[tokio::test]
    async fn rover_id_is_percent_decoded() {
        let stub = Arc::new(StubFleet::default());
        let _ = get_json(app(stub.clone()), "/api/rover/Rover%207/status").await;
        assert_eq!(stub.calls(), vec!["rover_status:Rover 7"]);
    }

    #[tokio::test]
    async fn upstream_not_found_keeps_status() {
        let stub = Arc::new(StubFleet::default());
        let (status, body) = get_json(app(stub), "/api/rover/ghost/status").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
        assert_eq!(body["detail"], "API error (404): Rover not found");
    }

    #[tokio::test]
    async fn timeout_is_gateway_timeout() {
        let stub = Arc::new(StubFleet::default());
        let (status, body) = get_json(app(stub), "/api/rover/Rover-1/battery").await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn session_failure_is_service_unavailable() {
        let stub = Arc::new(StubFleet::default());
        let (status, body) = get_json(app(stub), "/api/rover/Rover-1/coordinates").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "failed to create session: connection refused");
    }

    #[tokio::test]
    async fn all_rover_data_uses_wire_names() {
        let stub = Arc::new(StubFleet::default());
        let (status, body) = get_json(app(stub), "/api/all-rover-data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["fleetStatus"]["active"], 1);
        let rover = &body["data"]["roverData"]["Rover-1"];
        assert_eq!(rover["status"]["state"], "error");
        assert_eq!(rover["sensorData"], json!({}));
    }

    #[tokio::test]
    async fn unknown_rover_resource_is_404_without_upstream_call() {
        let stub = Arc::new(StubFleet::default());
        let req = Request::builder()
            .uri("/api/rover/Rover-1/engine")
            .body(Body::empty())
            .unwrap();
        let resp = app(stub.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(stub.calls().is_empty());
    }
}
