//! Error taxonomy for upstream proxying.

/// Errors produced while talking to the upstream fleet API.
///
/// `SessionExpired` never leaves the dispatcher: it is retried once and,
/// if the retry also reports expiry, escalated to [`ProxyError::Upstream`].
#[derive(Clone, Debug, thiserror::Error)]
pub enum ProxyError {
    /// A session could not be established.
    #[error("failed to create session: {0}")]
    UpstreamUnavailable(String),

    /// The upstream rejected the current session token.
    #[error("session expired ({status}): {body}")]
    SessionExpired {
        /// Status of the response that signalled expiry.
        status: u16,
        /// Raw body of that response.
        body: String,
    },

    /// Non-2xx response without an expiry signal.
    #[error("API error ({status}): {body}")]
    Upstream {
        /// Upstream status code.
        status: u16,
        /// Raw upstream body.
        body: String,
    },

    /// No response was received: connect failure, reset, or timeout.
    #[error("failed to call API: {message}")]
    Transport {
        /// Transport error description (never includes the request URL).
        message: String,
        /// Whether the request hit the configured timeout.
        timed_out: bool,
    },

    /// 2xx response whose body is not JSON.
    #[error("malformed upstream response ({status}): {body}")]
    MalformedBody {
        /// Upstream status code.
        status: u16,
        /// Raw upstream body.
        body: String,
    },

    /// Unexpected local failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Build a transport error from a `reqwest` failure.
    ///
    /// The URL is stripped because it carries the session token.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let timed_out = err.is_timeout();
        Self::Transport {
            message: err.without_url().to_string(),
            timed_out,
        }
    }

    /// Whether this error means the session token went stale.
    pub fn is_session_expiry(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Turn an expiry that survived the retry into the [`ProxyError::Upstream`]
    /// callers see. Other variants pass through.
    #[must_use]
    pub fn escalate_expiry(self) -> Self {
        match self {
            Self::SessionExpired { status, body } => Self::Upstream { status, body },
            other => other,
        }
    }

    /// HTTP status the gateway should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UpstreamUnavailable(_) => 503,
            Self::Upstream { status, .. } if (400..=599).contains(status) => *status,
            Self::Transport {
                timed_out: true, ..
            } => 504,
            Self::SessionExpired { .. }
            | Self::Upstream { .. }
            | Self::Transport { .. }
            | Self::MalformedBody { .. } => 502,
            Self::Internal(_) => 500,
        }
    }

    /// Short classification string for logs.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::SessionExpired { .. } => "session_expired",
            Self::Upstream { .. } => "upstream_error",
            Self::Transport {
                timed_out: true, ..
            } => "timeout",
            Self::Transport { .. } => "network_error",
            Self::MalformedBody { .. } => "malformed_body",
            Self::Internal(_) => "internal_error",
        }
    }
}
