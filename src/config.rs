//! Authorization configuration
//!
//! One immutable struct read at startup and handed to
//! [`SecurityManager::from_config`](crate::security::SecurityManager::from_config).
//! Values come from a JSON file, then environment overrides.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::authority::{HttpPermissionAuthority, PermissionAuthority};
use crate::core::{AuthError, AuthResult, MessagingPermission};
use crate::identity::IdentityEquivalence;
use crate::logging::LoggingConfig;

pub const ENV_SESSION_PERMISSION: &str = "AUTHZ_SESSION_PERMISSION";
pub const ENV_REMOTE_CONTEXT: &str = "AUTHZ_REMOTE_CONTEXT";
pub const ENV_REMOTE_PERMISSIONS: &str = "AUTHZ_REMOTE_PERMISSIONS";
pub const ENV_REMOTE_TIMEOUT_MS: &str = "AUTHZ_REMOTE_TIMEOUT_MS";
pub const ENV_AUTHORITY_URL: &str = "AUTHZ_AUTHORITY_URL";
pub const ENV_LOG_FILTER: &str = "AUTHZ_LOG_FILTER";

fn default_session_permission() -> String {
    MessagingPermission::SessionRequired.name().to_string()
}

fn default_sub_context() -> String {
    "FSMessagingDefaultContext".to_string()
}

fn default_timeout_ms() -> Option<u64> {
    Some(5000)
}

/// Settings of the remote authority filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAuthorityConfig {
    /// Sub-context used when the request carries no override
    #[serde(default = "default_sub_context")]
    pub default_sub_context: String,

    /// Permission names resolved through the authority
    #[serde(default)]
    pub handled_permissions: Vec<String>,

    /// Bound on a single lookup in milliseconds (unbounded if null)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: Option<u64>,

    /// URL of the HTTP authority
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for RemoteAuthorityConfig {
    fn default() -> Self {
        Self {
            default_sub_context: default_sub_context(),
            handled_permissions: Vec::new(),
            timeout_ms: default_timeout_ms(),
            endpoint: None,
        }
    }
}

impl RemoteAuthorityConfig {
    /// Get the lookup bound as Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Build the HTTP authority for the configured endpoint
    pub fn http_authority(&self) -> Option<Arc<dyn PermissionAuthority>> {
        let endpoint = self.endpoint.as_deref()?;
        let mut authority = HttpPermissionAuthority::new(endpoint);
        if let Some(timeout) = self.timeout() {
            authority = authority.with_timeout(timeout);
        }
        Some(Arc::new(authority))
    }
}

/// Top-level authorization configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// Permission granted to any authenticated session
    #[serde(default = "default_session_permission")]
    pub session_permission: String,

    #[serde(default)]
    pub remote: RemoteAuthorityConfig,

    #[serde(default)]
    pub identity_equivalence: IdentityEquivalence,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            session_permission: default_session_permission(),
            remote: RemoteAuthorityConfig::default(),
            identity_equivalence: IdentityEquivalence::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AuthorizationConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::info!("[Config] Loaded authorization config from {}", path.display());
        Ok(config)
    }

    /// Load from a file, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Self::from_file(path)?.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Set the session-only permission
    pub fn with_session_permission(mut self, permission: impl Into<String>) -> Self {
        self.session_permission = permission.into();
        self
    }

    /// Set the default remote sub-context
    pub fn with_default_sub_context(mut self, sub_context: impl Into<String>) -> Self {
        self.remote.default_sub_context = sub_context.into();
        self
    }

    /// Set the permissions resolved through the remote authority
    pub fn with_handled_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remote.handled_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the remote lookup bound
    pub fn with_remote_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.remote.timeout_ms = timeout_ms;
        self
    }

    /// Set the HTTP authority endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.remote.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_identity_equivalence(mut self, equivalence: IdentityEquivalence) -> Self {
        self.identity_equivalence = equivalence;
        self
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> anyhow::Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup
    ///
    /// Unset keys leave the current value alone.
    pub fn apply_overrides<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SESSION_PERMISSION) {
            self.session_permission = value;
        }
        if let Some(value) = lookup(ENV_REMOTE_CONTEXT) {
            self.remote.default_sub_context = value;
        }
        if let Some(value) = lookup(ENV_REMOTE_PERMISSIONS) {
            self.remote.handled_permissions = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = lookup(ENV_REMOTE_TIMEOUT_MS) {
            let timeout_ms: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {}", ENV_REMOTE_TIMEOUT_MS, value))?;
            self.remote.timeout_ms = Some(timeout_ms);
        }
        if let Some(value) = lookup(ENV_AUTHORITY_URL) {
            self.remote.endpoint = Some(value);
        }
        if let Some(value) = lookup(ENV_LOG_FILTER) {
            self.logging.filter = value;
        }
        Ok(self)
    }

    /// Check the configuration can build a filter chain
    pub fn validate(&self) -> AuthResult<()> {
        if self.session_permission.trim().is_empty() {
            return Err(AuthError::invalid_argument(
                "No session permission name provided (empty)",
            ));
        }
        if self.remote.default_sub_context.trim().is_empty() {
            return Err(AuthError::invalid_argument(
                "No default sub-context provided (empty)",
            ));
        }
        if self.remote.handled_permissions.is_empty() {
            return Err(AuthError::invalid_argument(
                "Empty handled permissions set provided",
            ));
        }
        if self
            .remote
            .handled_permissions
            .iter()
            .any(|p| p.trim().is_empty())
        {
            return Err(AuthError::invalid_argument(
                "Handled permissions contain an empty name",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn valid() -> AuthorizationConfig {
        AuthorizationConfig::new().with_handled_permissions(["UserMessagingAdminRole"])
    }

    #[test]
    fn test_defaults() {
        let config: AuthorizationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AuthorizationConfig::default());
        assert_eq!(config.session_permission, "SessionRequired");
        assert_eq!(config.remote.default_sub_context, "FSMessagingDefaultContext");
        assert_eq!(config.remote.timeout(), Some(Duration::from_millis(5000)));
        assert_eq!(config.identity_equivalence.service_account_prefix, "cis.proc");
        assert!(config.remote.http_authority().is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "remote": {{
                    "handled_permissions": ["UserMessagingAdminRole", "MessagingClientRole"],
                    "timeout_ms": null,
                    "endpoint": "http://authority.local/permissions"
                }},
                "logging": {{ "json": true }}
            }}"#
        )
        .unwrap();

        let config = AuthorizationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.remote.handled_permissions.len(), 2);
        assert_eq!(config.remote.timeout(), None);
        assert!(config.logging.json);
        assert!(config.remote.http_authority().is_some());
        config.validate().unwrap();
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AuthorizationConfig::from_file(dir.path().join("missing.json")).is_err());

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = AuthorizationConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_SESSION_PERMISSION, "LoggedIn"),
            (ENV_REMOTE_CONTEXT, "FSMessagingSupportAdminContext"),
            (ENV_REMOTE_PERMISSIONS, "AdminRole, ClientRole,,"),
            (ENV_REMOTE_TIMEOUT_MS, "250"),
            (ENV_AUTHORITY_URL, "http://authority.local"),
            (ENV_LOG_FILTER, "debug"),
        ]
        .into_iter()
        .collect();

        let config = valid()
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.session_permission, "LoggedIn");
        assert_eq!(config.remote.default_sub_context, "FSMessagingSupportAdminContext");
        assert_eq!(config.remote.handled_permissions, vec!["AdminRole", "ClientRole"]);
        assert_eq!(config.remote.timeout_ms, Some(250));
        assert_eq!(config.remote.endpoint.as_deref(), Some("http://authority.local"));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_bad_timeout_override() {
        let result = valid().apply_overrides(|key| {
            (key == ENV_REMOTE_TIMEOUT_MS).then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        valid().validate().unwrap();

        let err = AuthorizationConfig::new().validate().unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument(_)));

        let err = valid().with_session_permission("").validate().unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument(_)));

        let err = valid().with_default_sub_context(" ").validate().unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument(_)));

        let err = valid()
            .with_handled_permissions(["AdminRole", ""])
            .validate()
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument(_)));
    }
}
