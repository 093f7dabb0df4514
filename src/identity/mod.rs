//! Identity collaborator
//!
//! The session store that knows who is calling lives outside this crate.
//! It is consumed through [`IdentityProvider`], which each deployment
//! implements on top of its own request state.
//!
//! - [`IdentityProvider`] - session id, user id and sub-context lookups
//! - [`UserIdEnforcer`] - same-user assertions for non-permission endpoints

mod enforcer;

pub use enforcer::{IdentityEquivalence, UserIdEnforcer, NOT_A_PARTICIPANT_MESSAGE};

use async_trait::async_trait;

/// Source of the caller's identity for the current request
///
/// Implementations read ambient request state (headers, cookies, a cached
/// session). Every method returns `None` when the value is unknown.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Session identifier of the authenticated caller
    async fn authenticated_session_id(&self) -> Option<String>;

    /// User identifier bound to the authenticated session
    async fn authenticated_user_id(&self) -> Option<String>;

    /// Sub-context stored on the caller's session
    ///
    /// This may force a full session read, so callers only ask for it
    /// when an operation declares it needs it.
    async fn current_sub_context(&self) -> Option<String>;
}

/// Check if an identifier is missing
///
/// `None`, the empty string and the literal `"null"` (any case) all count
/// as absent. Session tokens arrive as query parameters, where a client
/// with no session sends `"null"`.
pub fn is_absent(id: Option<&str>) -> bool {
    match id {
        None => true,
        Some(value) => {
            let value = value.trim();
            value.is_empty() || value.eq_ignore_ascii_case("null")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absent() {
        assert!(is_absent(None));
        assert!(is_absent(Some("")));
        assert!(is_absent(Some("   ")));
        assert!(is_absent(Some("null")));
        assert!(is_absent(Some("NULL")));
        assert!(!is_absent(Some("s1")));
        assert!(!is_absent(Some("nullable")));
    }
}
