//! Gateway error types.
//!
//! Every gateway failure ends the current poll cycle and buys the long delay,
//! so the worker itself does not branch on the kind. The kind and
//! [`GatewayError::is_transient`] exist so the logs say whether a failure is
//! likely to clear up without an operator:
//!
//! - **Transient**: timeouts, connection failures, HTTP 5xx and 429
//! - **Permanent**: other HTTP 4xx, GraphQL errors (schema or permission
//!   mismatch), responses that do not have the expected shape

use std::fmt;
use thiserror::Error;

/// The kind of gateway error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// The request did not complete within the per-call timeout.
    Timeout,

    /// Connection, TLS or other transport-level failure.
    Transport,

    /// The endpoint answered with a non-success HTTP status.
    Status,

    /// The endpoint answered with a GraphQL `errors` array.
    GraphQl,

    /// The response body was not the expected JSON shape.
    Malformed,
}

/// A gateway request failure.
#[derive(Debug, Error)]
pub struct GatewayError {
    /// What went wrong.
    pub kind: GatewayErrorKind,

    /// The HTTP status code, if a response was received.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying HTTP client error, if any.
    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "gateway error (HTTP {}): {}", code, self.message),
            None => write!(f, "gateway error: {}", self.message),
        }
    }
}

impl GatewayError {
    /// Categorizes an HTTP client error.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let kind = if err.is_timeout() {
            GatewayErrorKind::Timeout
        } else if err.is_decode() {
            GatewayErrorKind::Malformed
        } else if status_code.is_some() {
            GatewayErrorKind::Status
        } else {
            GatewayErrorKind::Transport
        };

        Self {
            kind,
            status_code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// A non-success HTTP status with (a prefix of) the response body.
    pub fn status(code: u16, body: &str) -> Self {
        Self {
            kind: GatewayErrorKind::Status,
            status_code: Some(code),
            message: truncate_body(body),
            source: None,
        }
    }

    /// A GraphQL response carrying one or more errors.
    pub fn graphql<'a>(messages: impl IntoIterator<Item = &'a str>) -> Self {
        let joined = messages.into_iter().collect::<Vec<_>>().join("; ");
        Self {
            kind: GatewayErrorKind::GraphQl,
            status_code: None,
            message: joined,
            source: None,
        }
    }

    /// A response that parsed but did not have the expected shape.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Malformed,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if retrying later is likely to succeed without intervention.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            GatewayErrorKind::Timeout | GatewayErrorKind::Transport => true,
            GatewayErrorKind::Status => matches!(
                self.status_code,
                Some(429) | Some(500..=599)
            ),
            GatewayErrorKind::GraphQl | GatewayErrorKind::Malformed => false,
        }
    }
}

/// Maximum number of body characters kept in a status error message.
const MAX_BODY_CHARS: usize = 200;

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Errors in gateway configuration, detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayConfigError {
    /// None of the endpoint variables is set.
    #[error("gateway endpoint not configured (set {0})")]
    MissingEndpoint(&'static str),

    /// The endpoint is not a valid URL.
    #[error("invalid gateway endpoint {value:?}: {reason}")]
    InvalidEndpoint { value: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_rate_limits_are_transient() {
        assert!(GatewayError::status(503, "unavailable").is_transient());
        assert!(GatewayError::status(500, "").is_transient());
        assert!(GatewayError::status(429, "slow down").is_transient());
    }

    #[test]
    fn client_errors_are_permanent() {
        assert!(!GatewayError::status(400, "bad request").is_transient());
        assert!(!GatewayError::status(401, "unauthorized").is_transient());
    }

    #[test]
    fn graphql_and_malformed_errors_are_permanent() {
        assert!(!GatewayError::graphql(["field not found"]).is_transient());
        assert!(!GatewayError::malformed("no data").is_transient());
    }

    #[test]
    fn graphql_messages_are_joined() {
        let err = GatewayError::graphql(["first", "second"]);
        assert_eq!(err.kind, GatewayErrorKind::GraphQl);
        assert_eq!(err.message, "first; second");
        assert_eq!(err.to_string(), "gateway error: first; second");
    }

    #[test]
    fn status_display_includes_code() {
        let err = GatewayError::status(502, "bad gateway\n");
        assert_eq!(err.to_string(), "gateway error (HTTP 502): bad gateway");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_BODY_CHARS + 50);
        let err = GatewayError::status(500, &body);
        assert_eq!(err.message.len(), MAX_BODY_CHARS + 3);
        assert!(err.message.ends_with("..."));
    }
}
