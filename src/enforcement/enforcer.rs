//! Before-call enforcement point
//!
//! Turns declared [`PermissionRequired`] metadata into a decision and lets
//! the wrapped call run only when it is granted.

use std::future::Future;
use std::sync::Arc;

use super::descriptor::PermissionRequired;
use crate::core::{AuthError, AuthResult, AuthorizationContext};
use crate::identity::is_absent;
use crate::security::SecurityManager;

/// Rejection message when the caller has no session
pub const NO_SESSION_MESSAGE: &str = "User not authenticated. No session ID.";

/// Gate in front of protected operations
#[derive(Debug, Clone)]
pub struct Enforcer {
    manager: Arc<SecurityManager>,
}

impl Enforcer {
    pub fn new(manager: Arc<SecurityManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<SecurityManager> {
        &self.manager
    }

    /// Decide whether a call declaring `descriptor` may proceed
    ///
    /// Authentication is checked before any permission logic. The session
    /// sub-context is read only when the descriptor asks for it.
    pub async fn enforce(&self, descriptor: &PermissionRequired) -> AuthResult<()> {
        let mut context = AuthorizationContext::new(descriptor.permissions().iter().cloned())?;

        let session_id = self.manager.authenticated_session_id().await;
        if is_absent(session_id.as_deref()) {
            return Err(AuthError::unauthenticated(NO_SESSION_MESSAGE));
        }

        if descriptor.resolve_sub_context() {
            if let Some(sub_context) = self.manager.current_sub_context().await {
                if !is_absent(Some(sub_context.as_str())) {
                    context.set_sub_context(sub_context);
                }
            }
        }

        if !self.manager.is_authorized(&mut context).await? {
            tracing::info!(
                "[Enforcer] Authorization denied; required permissions={:?}, sub_context={:?}",
                context.permission_names(),
                context.sub_context()
            );
            return Err(AuthError::unauthorized());
        }

        Ok(())
    }

    /// Run `op` only if `descriptor` is granted
    ///
    /// The operation's output is returned untouched; on rejection it is
    /// never polled.
    pub async fn guard<F, Fut, T>(&self, descriptor: &PermissionRequired, op: F) -> AuthResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.enforce(descriptor).await?;
        Ok(op().await)
    }
}
