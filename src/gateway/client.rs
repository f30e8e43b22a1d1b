//! GraphQL-over-HTTP client for the campaign store.
//!
//! The store is a Hasura endpoint. Every request is a `POST` of
//! `{"query": ..., "variables": ...}` with the admin secret header, and is
//! bounded by a per-call timeout so a hung endpoint cannot wedge the worker.

use std::fmt;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::error::{GatewayConfigError, GatewayError};

/// Default per-call timeout (10 seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Header carrying the admin secret.
const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// Endpoint variables, in lookup order.
const ENDPOINT_VARS: [&str; 2] = ["GRAPHQL_ENDPOINT", "VITE_PUBLIC_GRAPHQL_ENDPOINT"];

/// Connection settings for the store gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Full URL of the GraphQL endpoint.
    pub endpoint: Url,

    /// Value for the admin secret header. No header is sent when unset.
    pub admin_secret: Option<String>,

    /// Timeout applied to each request individually.
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Creates a configuration for the given endpoint.
    ///
    /// A bare `host/path` (as the web app's environment stores it) is taken
    /// to mean `https://host/path`.
    pub fn new(endpoint: &str) -> Result<Self, GatewayConfigError> {
        Ok(GatewayConfig {
            endpoint: normalize_endpoint(endpoint)?,
            admin_secret: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn with_admin_secret(mut self, secret: impl Into<String>) -> Self {
        self.admin_secret = Some(secret.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// - `GRAPHQL_ENDPOINT` (or `VITE_PUBLIC_GRAPHQL_ENDPOINT`): required
    /// - `HASURA_ADMIN_SECRET`: optional
    /// - `CRITICAL_MASS_REQUEST_TIMEOUT_SECS`: optional, default 10
    pub fn from_env() -> Result<Self, GatewayConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GatewayConfigError> {
        let endpoint = ENDPOINT_VARS
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
            .ok_or(GatewayConfigError::MissingEndpoint(
                "GRAPHQL_ENDPOINT or VITE_PUBLIC_GRAPHQL_ENDPOINT",
            ))?;

        let mut config = Self::new(&endpoint)?;

        if let Some(secret) = lookup("HASURA_ADMIN_SECRET").filter(|s| !s.is_empty()) {
            config = config.with_admin_secret(secret);
        }

        if let Some(secs) = lookup("CRITICAL_MASS_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// The endpoint with any userinfo credentials masked, for logging.
    pub fn redacted_endpoint(&self) -> String {
        let mut url = self.endpoint.clone();
        if !url.username().is_empty() {
            let _ = url.set_username("***");
        }
        if url.password().is_some() {
            let _ = url.set_password(Some("***"));
        }
        url.to_string()
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("endpoint", &self.redacted_endpoint())
            .field(
                "admin_secret",
                &self.admin_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn normalize_endpoint(raw: &str) -> Result<Url, GatewayConfigError> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    Url::parse(&with_scheme).map_err(|e| GatewayConfigError::InvalidEndpoint {
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

// ─── Wire envelope ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// A GraphQL client bound to one store endpoint.
#[derive(Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl GraphQlClient {
    /// Builds the HTTP client.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .build()
            .map_err(GatewayError::from_reqwest)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Sends one GraphQL document and decodes its `data` member.
    ///
    /// Failures are logged with their kind and whether they are transient
    /// before being returned.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, GatewayError> {
        trace!(operation, "Sending GraphQL request");

        let result = self.send(operation, query, variables).await;
        if let Err(err) = &result {
            warn!(
                operation,
                kind = ?err.kind,
                transient = err.is_transient(),
                status = ?err.status_code,
                error = %err,
                "Gateway call failed"
            );
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, GatewayError> {

        let mut request = self
            .http
            .post(self.config.endpoint.clone())
            .json(&GraphQlRequest { query, variables })
            .timeout(self.config.request_timeout);

        if let Some(secret) = &self.config.admin_secret {
            request = request.header(ADMIN_SECRET_HEADER, secret);
        }

        let response = request.send().await.map_err(GatewayError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::status(status.as_u16(), &body));
        }

        let envelope: GraphQlResponse<T> =
            response.json().await.map_err(GatewayError::from_reqwest)?;

        if !envelope.errors.is_empty() {
            return Err(GatewayError::graphql(
                envelope.errors.iter().map(|e| e.message.as_str()),
            ));
        }

        envelope.data.ok_or_else(|| {
            GatewayError::malformed(format!("{operation}: response carried no data"))
        })
    }
}

impl fmt::Debug for GraphQlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQlClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
