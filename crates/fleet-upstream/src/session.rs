//! Process-wide upstream session token.
//!
//! The token is created lazily by `POST {base}/session/start` and replaced
//! whenever the dispatcher reports it stale. All access goes through one
//! async mutex, so concurrent first callers share a single mint.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::ProxyError;

#[derive(Deserialize)]
struct SessionStartResponse {
    session_id: Option<String>,
}

/// Owns the single current session token.
pub struct SessionManager {
    client: Client,
    start_url: Url,
    current: Mutex<Option<SecretString>>,
    mints: AtomicU64,
}

impl SessionManager {
    /// Create a manager that mints sessions against `base`.
    pub fn new(client: Client, base: &Url) -> Result<Self, ProxyError> {
        let mut start_url = base.clone();
        let _ = start_url
            .path_segments_mut()
            .map_err(|()| ProxyError::Internal(format!("base URL cannot take a path: {base}")))?
            .pop_if_empty()
            .extend(["session", "start"]);

        Ok(Self {
            client,
            start_url,
            current: Mutex::new(None),
            mints: AtomicU64::new(0),
        })
    }

    /// Return the current token, starting a session if there is none.
    pub async fn current_session(&self) -> Result<SecretString, ProxyError> {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref() {
            return Ok(token.clone());
        }

        let token = self.start_session().await?;
        *current = Some(token.clone());
        Ok(token)
    }

    /// Drop the current token so the next caller mints a new one.
    pub async fn invalidate(&self) {
        if self.current.lock().await.take().is_some() {
            info!("session invalidated");
        }
    }

    /// Drop the current token only if it is still `stale`.
    ///
    /// Returns `false` when another caller already replaced it.
    pub async fn invalidate_if_current(&self, stale: &SecretString) -> bool {
        let mut current = self.current.lock().await;
        let matches = current
            .as_ref()
            .is_some_and(|token| token.expose_secret() == stale.expose_secret());
        if matches {
            *current = None;
            info!("session expired, invalidated");
        }
        matches
    }

    /// Whether a token is currently held.
    pub async fn has_session(&self) -> bool {
        self.current.lock().await.is_some()
    }

    /// Number of sessions started by this manager.
    pub fn mint_count(&self) -> u64 {
        self.mints.load(Ordering::Relaxed)
    }

    async fn start_session(&self) -> Result<SecretString, ProxyError> {
        let resp = self
            .client
            .post(self.start_url.clone())
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                let e = ProxyError::from_transport(e);
                warn!(error = %e, "session start failed");
                ProxyError::UpstreamUnavailable(e.to_string())
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            ProxyError::UpstreamUnavailable(ProxyError::from_transport(e).to_string())
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "session start rejected");
            return Err(ProxyError::UpstreamUnavailable(format!(
                "session start returned {}: {body}",
                status.as_u16()
            )));
        }

        let parsed: SessionStartResponse = serde_json::from_str(&body).map_err(|e| {
            ProxyError::UpstreamUnavailable(format!("session start returned invalid JSON: {e}"))
        })?;

        let token = parsed
            .session_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ProxyError::UpstreamUnavailable("session start returned no session_id".into())
            })?;

        let mint_count = self.mints.fetch_add(1, Ordering::Relaxed) + 1;
        info!(mint_count, "created new upstream session");
        Ok(SecretString::from(token))
    }
}
