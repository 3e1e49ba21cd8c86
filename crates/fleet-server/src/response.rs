//! Response envelopes and error → HTTP status mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleet_upstream::ProxyError;
use serde::Serialize;

/// Success body: `{"status": "success", "data": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    /// Always `"success"`.
    pub status: &'static str,
    /// The upstream payload, unmodified.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap a payload.
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// Failure body: `{"status": "error", "detail": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Always `"error"`.
    pub status: &'static str,
    /// Human-readable failure description.
    pub detail: String,
}

/// A [`ProxyError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub ProxyError);

impl ApiError {
    /// HTTP status this error is answered with.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::BAD_GATEWAY)
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::debug!(status = status.as_u16(), error_kind = self.0.error_kind(), "request failed");
        }
        let body = ErrorBody {
            status: "error",
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handler result: enveloped JSON or an error body.
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Wrap `data` as a successful handler result.
pub fn success<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn envelope_shape() {
        let json = serde_json::to_value(Envelope::success(json!({"level": 50}))).unwrap();
        assert_eq!(json, json!({"status": "success", "data": {"level": 50}}));
    }

    #[tokio::test]
    async fn upstream_status_is_forwarded() {
        let err = ApiError::from(ProxyError::Upstream {
            status: 404,
            body: "Rover not found".into(),
        });
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(resp).await,
            json!({"status": "error", "detail": "API error (404): Rover not found"})
        );
    }

    #[tokio::test]
    async fn session_failure_is_service_unavailable() {
        let resp = ApiError(ProxyError::UpstreamUnavailable("refused".into())).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["detail"], "failed to create session: refused");
    }

    #[test]
    fn transport_statuses() {
        let timeout = ApiError(ProxyError::Transport {
            message: "timed out".into(),
            timed_out: true,
        });
        let reset = ApiError(ProxyError::Transport {
            message: "reset".into(),
            timed_out: false,
        });
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(reset.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn malformed_and_internal_statuses() {
        let malformed = ApiError(ProxyError::MalformedBody {
            status: 200,
            body: "<html>".into(),
        });
        assert_eq!(malformed.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError(ProxyError::Internal("bug".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
