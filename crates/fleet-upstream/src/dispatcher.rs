//! Proxy dispatcher: resource request → upstream GET, with one retry on
//! session expiry.

use std::time::Duration;

use async_trait::async_trait;
use fleet_settings::GatewaySettings;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::aggregate::{AllRoverData, RoverDataMap, RoverRecord};
use crate::api::FleetApi;
use crate::errors::ProxyError;
use crate::expiry::classify_response;
use crate::resource::{ResourceRequest, RoverId};
use crate::session::SessionManager;

/// Retries allowed after the upstream reports an expired session.
const MAX_EXPIRY_RETRIES: u32 = 1;

/// Connection details for the upstream fleet API.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// Base URL every resource path is appended to.
    pub base_url: String,
    /// Whole-request timeout.
    pub request_timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Rovers visited by the aggregate, in order.
    pub rovers: Vec<RoverId>,
}

impl UpstreamConfig {
    /// Config for `base_url` with the default timeouts and rover list.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut config = Self::from_settings(&GatewaySettings::default());
        config.base_url = base_url.into();
        config
    }

    /// Extract the upstream section of the gateway settings.
    pub fn from_settings(settings: &GatewaySettings) -> Self {
        Self {
            base_url: settings.upstream.base_url.clone(),
            request_timeout: Duration::from_millis(settings.upstream.request_timeout_ms),
            connect_timeout: Duration::from_millis(settings.upstream.connect_timeout_ms),
            rovers: settings.rovers.iter().map(|id| RoverId::new(id.as_str())).collect(),
        }
    }

    /// Replace the rover list.
    #[must_use]
    pub fn with_rovers<I, R>(mut self, rovers: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoverId>,
    {
        self.rovers = rovers.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Forwards resource requests to the upstream API.
pub struct ProxyDispatcher {
    client: Client,
    base: Url,
    sessions: SessionManager,
    rovers: Vec<RoverId>,
}

impl ProxyDispatcher {
    /// Build the HTTP client and session manager for `config`.
    pub fn new(config: UpstreamConfig) -> Result<Self, ProxyError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            ProxyError::Internal(format!("invalid upstream URL {:?}: {e}", config.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(ProxyError::Internal(format!(
                "upstream URL cannot take a path: {base}"
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("fleet-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to build HTTP client: {e}")))?;

        let sessions = SessionManager::new(client.clone(), &base)?;

        Ok(Self {
            client,
            base,
            sessions,
            rovers: config.rovers,
        })
    }

    /// The session manager backing this dispatcher.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Upstream URL for `request`, without the session query parameter.
    pub fn resource_url(&self, request: &ResourceRequest) -> Result<Url, ProxyError> {
        let mut url = self.base.clone();
        let _ = url
            .path_segments_mut()
            .map_err(|()| ProxyError::Internal(format!("base URL cannot take a path: {}", self.base)))?
            .pop_if_empty()
            .extend(request.path_segments());
        Ok(url)
    }

    /// Fetch one resource, refreshing the session and retrying once if the
    /// upstream reports it expired.
    #[instrument(skip_all, fields(resource = %request, kind = request.kind().as_str()))]
    pub async fn fetch(&self, request: &ResourceRequest) -> Result<Value, ProxyError> {
        let mut retries = 0;
        loop {
            let token = self.sessions.current_session().await?;
            match self.send_once(request, &token).await {
                Ok(payload) => return Ok(payload),
                Err(e) if e.is_session_expiry() => {
                    if retries >= MAX_EXPIRY_RETRIES {
                        warn!(error = %e, "session rejected again after refresh, giving up");
                        return Err(e.escalate_expiry());
                    }
                    retries += 1;
                    info!(attempt = retries, "session expired, retrying with a fresh session");
                    if !self.sessions.invalidate_if_current(&token).await {
                        debug!("session already replaced by a concurrent caller");
                    }
                }
                Err(e) => {
                    warn!(error_kind = e.error_kind(), error = %e, "upstream request failed");
                    return Err(e);
                }
            }
        }
    }

    async fn send_once(
        &self,
        request: &ResourceRequest,
        token: &SecretString,
    ) -> Result<Value, ProxyError> {
        let url = self.resource_url(request)?;
        let resp = self
            .client
            .get(url)
            .query(&[("session_id", token.expose_secret())])
            .header("accept", "application/json")
            .send()
            .await
            .map_err(ProxyError::from_transport)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(ProxyError::from_transport)?;
        debug!(status, bytes = body.len(), "upstream responded");
        classify_response(status, body)
    }

    async fn fetch_rover(&self, rover: &RoverId) -> Result<RoverRecord, ProxyError> {
        let status = self.fetch(&ResourceRequest::rover_status(rover.clone())).await?;
        let sensor_data = self.fetch(&ResourceRequest::sensor_data(rover.clone())).await?;
        let battery = self.fetch(&ResourceRequest::battery(rover.clone())).await?;
        let coordinates = self.fetch(&ResourceRequest::coordinates(rover.clone())).await?;
        Ok(RoverRecord {
            error: None,
            status,
            sensor_data,
            battery,
            coordinates,
        })
    }
}

#[async_trait]
impl FleetApi for ProxyDispatcher {
    async fn fleet_status(&self) -> Result<Value, ProxyError> {
        self.fetch(&ResourceRequest::fleet_status()).await
    }

    async fn rover_status(&self, rover: RoverId) -> Result<Value, ProxyError> {
        self.fetch(&ResourceRequest::rover_status(rover)).await
    }

    async fn sensor_data(&self, rover: RoverId) -> Result<Value, ProxyError> {
        self.fetch(&ResourceRequest::sensor_data(rover)).await
    }

    async fn battery_level(&self, rover: RoverId) -> Result<Value, ProxyError> {
        self.fetch(&ResourceRequest::battery(rover)).await
    }

    async fn coordinates(&self, rover: RoverId) -> Result<Value, ProxyError> {
        self.fetch(&ResourceRequest::coordinates(rover)).await
    }

    /// Fleet status is fatal; a failing rover is replaced by a degraded
    /// record and the walk continues.
    async fn fetch_all_rover_data(&self) -> Result<AllRoverData, ProxyError> {
        let fleet_status = self.fetch(&ResourceRequest::fleet_status()).await?;

        let mut rover_data = RoverDataMap::default();
        for rover in &self.rovers {
            let record = match self.fetch_rover(rover).await {
                Ok(record) => record,
                Err(e) => {
                    error!(
                        rover_id = %rover,
                        error_kind = e.error_kind(),
                        error = %e,
                        "rover fetch failed, substituting degraded record"
                    );
                    RoverRecord::degraded(&e)
                }
            };
            rover_data.push(rover.clone(), record);
        }

        Ok(AllRoverData {
            fleet_status,
            rover_data,
        })
    }
}
