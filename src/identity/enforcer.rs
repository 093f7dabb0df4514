//! Same-user assertions for endpoints gated by identity, not permission

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{is_absent, IdentityProvider};
use crate::core::{AuthError, AuthResult};

/// Message prefix for participant rejections
pub const NOT_A_PARTICIPANT_MESSAGE: &str =
    "Logged in user is not a participant and does not have access to perform activity";

fn default_service_account_prefix() -> String {
    "cis.proc".to_string()
}

fn default_contributor_prefix() -> String {
    "cis.wkca".to_string()
}

/// Prefixes of the service-account / well-known-contributor carve-out
///
/// An authenticated service account may act as any well-known contributor.
/// The reverse does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEquivalence {
    #[serde(default = "default_service_account_prefix")]
    pub service_account_prefix: String,
    #[serde(default = "default_contributor_prefix")]
    pub contributor_prefix: String,
}

impl Default for IdentityEquivalence {
    fn default() -> Self {
        Self {
            service_account_prefix: default_service_account_prefix(),
            contributor_prefix: default_contributor_prefix(),
        }
    }
}

impl IdentityEquivalence {
    pub fn new(
        service_account_prefix: impl Into<String>,
        contributor_prefix: impl Into<String>,
    ) -> Self {
        Self {
            service_account_prefix: service_account_prefix.into(),
            contributor_prefix: contributor_prefix.into(),
        }
    }

    /// Check if `candidate` names the same user as `authenticated`
    pub fn user_ids_match(&self, authenticated: Option<&str>, candidate: &str) -> bool {
        let authenticated = match authenticated {
            Some(id) if !is_absent(Some(id)) => id,
            _ => return false,
        };

        if authenticated.starts_with(&self.service_account_prefix)
            && candidate.starts_with(&self.contributor_prefix)
        {
            return true;
        }

        authenticated == candidate
    }
}

/// Asserts that a request acts on behalf of the logged-in user
pub struct UserIdEnforcer {
    identity: Arc<dyn IdentityProvider>,
    equivalence: IdentityEquivalence,
}

impl UserIdEnforcer {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            equivalence: IdentityEquivalence::default(),
        }
    }

    /// Replace the equivalence prefixes
    pub fn with_equivalence(mut self, equivalence: IdentityEquivalence) -> Self {
        self.equivalence = equivalence;
        self
    }

    pub fn equivalence(&self) -> &IdentityEquivalence {
        &self.equivalence
    }

    /// Session id of the caller
    pub async fn session_token(&self) -> Option<String> {
        self.identity.authenticated_session_id().await
    }

    /// User id bound to the caller's session
    pub async fn session_user_id(&self) -> Option<String> {
        self.identity.authenticated_user_id().await
    }

    /// See [`IdentityEquivalence::user_ids_match`]
    pub fn user_ids_match(&self, authenticated: Option<&str>, candidate: &str) -> bool {
        self.equivalence.user_ids_match(authenticated, candidate)
    }

    /// Reject unless `user_id` matches the authenticated user
    ///
    /// With `log_mismatch` set, a rejection is logged at warn level naming
    /// the activity (if any) and both ids.
    pub async fn enforce_user_id_is_authenticated_with(
        &self,
        user_id: &str,
        activity: Option<&str>,
        log_mismatch: bool,
    ) -> AuthResult<()> {
        let session_user = self.identity.authenticated_user_id().await;
        if self.user_ids_match(session_user.as_deref(), user_id) {
            return Ok(());
        }

        if log_mismatch {
            let activity = activity.map(|a| format!("'{}' ", a)).unwrap_or_default();
            tracing::warn!(
                "[UserIdEnforcer] Rejecting {}request in behalf of user: {}, session user is: {}",
                activity,
                user_id,
                session_user.as_deref().unwrap_or("<none>")
            );
        }

        Err(AuthError::unauthorized())
    }

    /// Reject unless `user_id` matches the authenticated user, logging the activity
    pub async fn enforce_user_id_is_authenticated_for(
        &self,
        user_id: &str,
        activity: &str,
    ) -> AuthResult<()> {
        self.enforce_user_id_is_authenticated_with(user_id, Some(activity), true)
            .await
    }

    /// Reject unless `user_id` matches the authenticated user
    pub async fn enforce_user_id_is_authenticated(&self, user_id: &str) -> AuthResult<()> {
        self.enforce_user_id_is_authenticated_with(user_id, None, true)
            .await
    }

    /// Reject unless the authenticated user is one of `participants`
    pub async fn enforce_current_user_is_participant<S: AsRef<str>>(
        &self,
        participants: &[S],
        activity: &str,
    ) -> AuthResult<()> {
        let session_user = self.identity.authenticated_user_id().await;
        let is_participant = match session_user.as_deref() {
            Some(user) if !is_absent(Some(user)) => {
                participants.iter().any(|p| p.as_ref() == user)
            }
            _ => false,
        };

        if is_participant {
            return Ok(());
        }

        tracing::warn!(
            "[UserIdEnforcer] User {} is not a participant, rejecting '{}'",
            session_user.as_deref().unwrap_or("<none>"),
            activity
        );
        Err(AuthError::unauthorized_with(format!(
            "{}: {}",
            NOT_A_PARTICIPANT_MESSAGE, activity
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UNAUTHORIZED_MESSAGE;
    use crate::testing::MockIdentity;

    const TEST_USER: &str = "cis.user.TEST-TEST";
    const SERVICE_ACCOUNT: &str = "cis.proc.MMMM-JJJ";
    const CONTRIBUTOR: &str = "cis.wkca.MERE-ERE";

    fn enforcer(user: Option<&str>) -> UserIdEnforcer {
        UserIdEnforcer::new(Arc::new(MockIdentity::new(Some("test session id"), user)))
    }

    #[test]
    fn test_user_ids_match() {
        let eq = IdentityEquivalence::default();

        assert!(eq.user_ids_match(Some(SERVICE_ACCOUNT), CONTRIBUTOR));
        assert!(!eq.user_ids_match(Some(CONTRIBUTOR), SERVICE_ACCOUNT));
        assert!(!eq.user_ids_match(None, TEST_USER));
        assert!(!eq.user_ids_match(Some(TEST_USER), SERVICE_ACCOUNT));
        assert!(!eq.user_ids_match(Some(SERVICE_ACCOUNT), TEST_USER));
        assert!(eq.user_ids_match(Some(TEST_USER), TEST_USER));
        assert!(eq.user_ids_match(Some("A"), "A"));
        assert!(!eq.user_ids_match(Some("A"), "B"));

        // Absent session users never match, even an identical candidate
        assert!(!eq.user_ids_match(Some(""), ""));
        assert!(!eq.user_ids_match(Some("null"), "null"));
        assert!(!eq.user_ids_match(Some("NULL"), "NULL"));
    }

    #[tokio::test]
    async fn test_blank_session_user_rejected() {
        let blank = enforcer(Some(""));
        let err = blank.enforce_user_id_is_authenticated("").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));

        let null_user = enforcer(Some("null"));
        assert!(null_user
            .enforce_user_id_is_authenticated("null")
            .await
            .is_err());
    }

    #[test]
    fn test_custom_prefixes() {
        let eq = IdentityEquivalence::new("svc.", "bot.");
        assert!(eq.user_ids_match(Some("svc.importer"), "bot.announcer"));
        assert!(!eq.user_ids_match(Some(SERVICE_ACCOUNT), CONTRIBUTOR));
    }

    #[test]
    fn test_equivalence_deserialize_defaults() {
        let eq: IdentityEquivalence = serde_json::from_str("{}").unwrap();
        assert_eq!(eq, IdentityEquivalence::default());

        let eq: IdentityEquivalence =
            serde_json::from_str(r#"{"contributor_prefix":"bot."}"#).unwrap();
        assert_eq!(eq.service_account_prefix, "cis.proc");
        assert_eq!(eq.contributor_prefix, "bot.");
    }

    #[tokio::test]
    async fn test_session_accessors() {
        let enforcer = enforcer(Some(TEST_USER));
        assert_eq!(
            enforcer.session_token().await.as_deref(),
            Some("test session id")
        );
        assert_eq!(enforcer.session_user_id().await.as_deref(), Some(TEST_USER));
    }

    #[tokio::test]
    async fn test_same_user_accepted() {
        let enforcer = enforcer(Some(TEST_USER));

        enforcer.enforce_user_id_is_authenticated(TEST_USER).await.unwrap();
        enforcer
            .enforce_user_id_is_authenticated_for(TEST_USER, "get-thread-messages")
            .await
            .unwrap();
        enforcer
            .enforce_user_id_is_authenticated_with(TEST_USER, None, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_other_user_rejected() {
        let enforcer = enforcer(Some("cis.user.SOMEONE-ELSE"));

        let err = enforcer
            .enforce_user_id_is_authenticated_for(TEST_USER, "get-thread-messages")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_missing_session_user_rejected() {
        let enforcer = enforcer(None);

        let err = enforcer
            .enforce_user_id_is_authenticated_with(TEST_USER, Some("get-thread-messages"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_service_account_posts_as_contributor() {
        let enforcer = enforcer(Some(SERVICE_ACCOUNT));
        enforcer.enforce_user_id_is_authenticated(CONTRIBUTOR).await.unwrap();
    }

    #[tokio::test]
    async fn test_participant_check() {
        let participants = ["participant A", "participant B", TEST_USER];

        let member = enforcer(Some(TEST_USER));
        member
            .enforce_current_user_is_participant(&participants, "get-thread-messages")
            .await
            .unwrap();

        let outsider = enforcer(Some("cis.user.OUTSIDER"));
        let err = outsider
            .enforce_current_user_is_participant(&participants, "get-thread-messages")
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(NOT_A_PARTICIPANT_MESSAGE));
        assert!(msg.contains("get-thread-messages"));

        let anonymous = enforcer(None);
        assert!(anonymous
            .enforce_current_user_is_participant(&participants, "get-thread-messages")
            .await
            .is_err());
    }
}
