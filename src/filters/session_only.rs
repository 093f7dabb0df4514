//! Session-only filter
//!
//! Grants when an authenticated session alone satisfies the declared
//! permission. Registered first in the chain so unauthenticated requests
//! never reach a filter that calls out to the remote authority.

use std::sync::Arc;

use async_trait::async_trait;

use super::chain::{AuthorizationFilter, Next};
use crate::core::{AuthError, AuthResult, AuthorizationContext, Permission};
use crate::identity::{is_absent, IdentityProvider};

/// Filter that always grants its configured permission to any authenticated caller
pub struct SessionOnlyFilter {
    identity: Arc<dyn IdentityProvider>,
    session_permission: Permission,
}

impl SessionOnlyFilter {
    /// Create the filter for the given session-only permission
    ///
    /// Fails with `InvalidArgument` if the permission name is empty.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        session_permission: impl Into<Permission>,
    ) -> AuthResult<Self> {
        let session_permission = session_permission.into();
        if session_permission.name().trim().is_empty() {
            return Err(AuthError::invalid_argument(
                "No session permission name provided (empty)",
            ));
        }

        Ok(Self {
            identity,
            session_permission,
        })
    }

    /// The permission granted on authentication alone
    pub fn session_permission(&self) -> &Permission {
        &self.session_permission
    }
}

#[async_trait]
impl AuthorizationFilter for SessionOnlyFilter {
    fn name(&self) -> &str {
        "session_only"
    }

    async fn is_authorized(
        &self,
        next: Next<'_>,
        context: &mut AuthorizationContext,
    ) -> AuthResult<bool> {
        // Identity comes first: no permission logic runs for an anonymous caller
        let user_id = self.identity.authenticated_user_id().await;
        if is_absent(user_id.as_deref()) {
            return Err(AuthError::unauthenticated(
                "The request is not authenticated with a valid session token",
            ));
        }

        if context.requires(self.session_permission.name()) {
            tracing::debug!(
                "[SessionOnlyFilter] '{}' satisfied by authenticated session",
                self.session_permission
            );
            return Ok(true);
        }

        next.is_authorized(context).await
    }
}
