//! Session-expiry detection for upstream responses.
//!
//! A response signals an expired session when any of these hold:
//! - status is 401
//! - status is 400 and the body mentions an expired or invalid session
//! - the body is not JSON and mentions an expired or invalid session

use serde_json::Value;

use crate::errors::ProxyError;

/// Phrases the upstream uses for stale tokens (matched case-insensitively).
const EXPIRY_PHRASES: [&str; 2] = ["session expired", "invalid session"];

/// Whether `text` mentions an expired or invalid session.
pub fn mentions_stale_session(text: &str) -> bool {
    let lower = text.to_lowercase();
    EXPIRY_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Turn one upstream response into a payload or a classified error.
///
/// Expiry yields [`ProxyError::SessionExpired`]; the caller decides
/// whether to retry.
pub fn classify_response(status: u16, body: String) -> Result<Value, ProxyError> {
    let parsed = serde_json::from_str::<Value>(&body);

    let expired = status == 401
        || (status == 400 && mentions_stale_session(&body))
        || (parsed.is_err() && mentions_stale_session(&body));
    if expired {
        return Err(ProxyError::SessionExpired { status, body });
    }

    if !(200..300).contains(&status) {
        return Err(ProxyError::Upstream { status, body });
    }

    parsed.map_err(|_| ProxyError::MalformedBody { status, body })
}
