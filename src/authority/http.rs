//! HTTP-backed permission authority
//!
//! POSTs a JSON [`PermissionQuery`] to the configured endpoint and expects a
//! JSON [`PermissionSet`] back.

use std::time::Duration;

use reqwest::Client;

use super::{PermissionAuthority, PermissionFuture, PermissionQuery, PermissionSet};
use crate::core::AuthorityError;

/// Remote authority reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpPermissionAuthority {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpPermissionAuthority {
    /// Create an authority for the given endpoint URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    /// Bound each request with a client-side timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a preconfigured client (custom TLS, proxies, default headers)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// The endpoint lookups are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_query(&self, query: PermissionQuery) -> Result<PermissionSet, AuthorityError> {
        tracing::debug!(
            "[HttpAuthority] Resolving {} permission(s) in '{}'",
            query.permissions.len(),
            query.sub_context
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("authorization-session-id", &query.session_id)
            .json(&query);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify(e))?;

        tracing::debug!("[HttpAuthority] Response status: {}", status);

        if !status.is_success() {
            tracing::error!("[HttpAuthority] Authority error: {} - {}", status, body);
            return Err(AuthorityError::transport(format!(
                "authority returned {}: {}",
                status, body
            )));
        }

        decode_permission_set(&body)
    }

    fn classify(&self, err: reqwest::Error) -> AuthorityError {
        if err.is_timeout() {
            AuthorityError::TimedOut(self.timeout.unwrap_or_default())
        } else if err.is_decode() {
            AuthorityError::other(err.to_string())
        } else {
            AuthorityError::transport(err.to_string())
        }
    }
}

impl PermissionAuthority for HttpPermissionAuthority {
    fn is_authorized(&self, query: PermissionQuery) -> PermissionFuture<'_> {
        Box::pin(self.send_query(query))
    }
}

fn decode_permission_set(body: &str) -> Result<PermissionSet, AuthorityError> {
    serde_json::from_str(body)
        .map_err(|e| AuthorityError::other(format!("invalid permission set: {}", e)))
}
