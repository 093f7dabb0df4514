//! SecurityManager - decision facade over the filter chain

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::authority::PermissionAuthority;
use crate::config::AuthorizationConfig;
use crate::core::{AuthResult, AuthorizationContext};
use crate::filters::{FilterChain, RemoteAuthorityFilter, SessionOnlyFilter};
use crate::identity::IdentityProvider;

/// Owns the filter chain prototype and the identity collaborator
///
/// Built once at startup and shared behind an `Arc`; every method takes
/// `&self`, so concurrent requests need no locking.
pub struct SecurityManager {
    identity: Arc<dyn IdentityProvider>,
    chain: FilterChain,
}

impl SecurityManager {
    /// Create a manager over a custom chain
    pub fn new(identity: Arc<dyn IdentityProvider>, chain: FilterChain) -> Self {
        Self { identity, chain }
    }

    /// Build the standard chain: session-only first, then the remote authority
    pub fn from_config(
        config: &AuthorizationConfig,
        identity: Arc<dyn IdentityProvider>,
        authority: Arc<dyn PermissionAuthority>,
    ) -> AuthResult<Self> {
        config.validate()?;

        let session_filter =
            SessionOnlyFilter::new(identity.clone(), config.session_permission.as_str())?;
        tracing::info!(
            "[SecurityManager] Session-only filter grants '{}'",
            session_filter.session_permission()
        );

        let mut remote_filter = RemoteAuthorityFilter::new(
            identity.clone(),
            authority,
            config.remote.default_sub_context.as_str(),
            config.remote.handled_permissions.iter().map(String::as_str),
        )?;
        if let Some(timeout) = config.remote.timeout() {
            remote_filter = remote_filter.with_timeout(timeout);
        }
        tracing::info!(
            "[SecurityManager] Remote authority filter handles {:?} in '{}'",
            remote_filter.handled_permissions(),
            remote_filter.default_sub_context()
        );

        let chain = FilterChain::builder()
            .filter(session_filter)
            .filter(remote_filter)
            .build();

        Ok(Self::new(identity, chain))
    }

    /// The filter chain prototype
    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    /// The identity collaborator
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    /// Run the filter chain over a context
    ///
    /// `Ok(false)` means no filter granted. Errors (`Unauthenticated`) come
    /// from filters that end the decision early.
    pub async fn is_authorized(&self, context: &mut AuthorizationContext) -> AuthResult<bool> {
        let decision_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "authorization",
            decision_id = %decision_id,
            permissions = ?context.permission_names(),
        );

        let result = self.chain.is_authorized(context).instrument(span.clone()).await;

        span.in_scope(|| match &result {
            Ok(granted) => tracing::debug!("[SecurityManager] Decision rendered: granted={}", granted),
            Err(e) => tracing::debug!("[SecurityManager] Decision aborted: {}", e),
        });

        result
    }

    pub async fn authenticated_session_id(&self) -> Option<String> {
        self.identity.authenticated_session_id().await
    }

    pub async fn authenticated_user_id(&self) -> Option<String> {
        self.identity.authenticated_user_id().await
    }

    /// Sub-context from the caller's session (may be an expensive read)
    pub async fn current_sub_context(&self) -> Option<String> {
        self.identity.current_sub_context().await
    }
}

impl std::fmt::Debug for SecurityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityManager")
            .field("chain", &self.chain)
            .finish()
    }
}
