//! Remote authority filter
//!
//! Resolves the caller's permissions through the external authority and
//! grants if any requested permission comes back authorized. Any failure of
//! the lookup is logged and treated as "no opinion": the chain continues and
//! its terminal default deny still applies.

use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;

use super::chain::{AuthorizationFilter, Next};
use crate::authority::{PermissionAuthority, PermissionQuery, PermissionSet};
use crate::core::{AuthError, AuthResult, AuthorityError, AuthorizationContext, Permission};
use crate::identity::{is_absent, IdentityProvider};

/// Filter checking permissions against the remote authority
pub struct RemoteAuthorityFilter {
    identity: Arc<dyn IdentityProvider>,
    authority: Arc<dyn PermissionAuthority>,
    default_sub_context: String,
    handled_permissions: BTreeSet<String>,
    timeout: Option<Duration>,
}

impl RemoteAuthorityFilter {
    /// Create the filter
    ///
    /// Fails with `InvalidArgument` if the default sub-context is empty or no
    /// handled permissions are given.
    pub fn new<I, P>(
        identity: Arc<dyn IdentityProvider>,
        authority: Arc<dyn PermissionAuthority>,
        default_sub_context: impl Into<String>,
        handled_permissions: I,
    ) -> AuthResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        let default_sub_context = default_sub_context.into();
        if default_sub_context.trim().is_empty() {
            return Err(AuthError::invalid_argument(
                "No default sub-context provided (empty)",
            ));
        }

        let handled_permissions: BTreeSet<String> = handled_permissions
            .into_iter()
            .map(|p| Into::<Permission>::into(p).name().to_string())
            .collect();
        if handled_permissions.is_empty() {
            return Err(AuthError::invalid_argument(
                "Empty handled permissions set provided",
            ));
        }

        Ok(Self {
            identity,
            authority,
            default_sub_context,
            handled_permissions,
            timeout: None,
        })
    }

    /// Bound each remote lookup; an elapsed bound counts as a failure
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Permission names this filter asks the authority about
    pub fn handled_permissions(&self) -> &BTreeSet<String> {
        &self.handled_permissions
    }

    /// Sub-context used when the context carries no override
    pub fn default_sub_context(&self) -> &str {
        &self.default_sub_context
    }

    /// Required permissions this filter is responsible for
    fn candidates(&self, context: &AuthorizationContext) -> BTreeSet<String> {
        context
            .permissions()
            .iter()
            .filter(|p| self.handled_permissions.contains(p.name()))
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Issue the lookup, folding timeouts and panics into `AuthorityError`
    async fn lookup(&self, query: PermissionQuery) -> Result<PermissionSet, AuthorityError> {
        // `is_authorized` itself may panic, so the future is built inside the guard
        let call = AssertUnwindSafe(async move { self.authority.is_authorized(query).await })
            .catch_unwind();

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| AuthorityError::TimedOut(limit))?,
            None => call.await,
        };

        outcome.unwrap_or_else(|_| Err(AuthorityError::other("remote authority lookup panicked")))
    }
}

#[async_trait]
impl AuthorizationFilter for RemoteAuthorityFilter {
    fn name(&self) -> &str {
        "remote_authority"
    }

    async fn is_authorized(
        &self,
        next: Next<'_>,
        context: &mut AuthorizationContext,
    ) -> AuthResult<bool> {
        // Usable outside a chain that authenticates first: no session means no opinion
        let session_id = match self.identity.authenticated_session_id().await {
            Some(id) if !is_absent(Some(id.as_str())) => id,
            _ => return next.is_authorized(context).await,
        };

        let candidates = self.candidates(context);
        if candidates.is_empty() {
            return next.is_authorized(context).await;
        }

        let sub_context = context
            .sub_context()
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| self.default_sub_context.clone());

        let query = PermissionQuery::new(session_id, sub_context.clone(), candidates.clone());
        match self.lookup(query).await {
            Ok(set) if set.authorizes_any(&candidates) => {
                tracing::debug!(
                    "[RemoteAuthorityFilter] Granted {:?} in '{}'",
                    set.authorized.intersection(&candidates).collect::<Vec<_>>(),
                    sub_context
                );
                return Ok(true);
            }
            Ok(_) => {
                tracing::debug!(
                    "[RemoteAuthorityFilter] None of {:?} authorized in '{}'",
                    candidates,
                    sub_context
                );
            }
            Err(e) => {
                tracing::debug!("[RemoteAuthorityFilter] Lookup failure: {:?}", e);
                tracing::error!("[RemoteAuthorityFilter] Exception resolving remote permissions: {}", e);
            }
        }

        next.is_authorized(context).await
    }
}
