//! Remote permission authority
//!
//! Given a session, a sub-context name and a candidate permission list, the
//! authority answers which of those permissions the caller actually holds.
//! Lookups are asynchronous and return a boxed future so implementations can
//! be backed by HTTP, a cache, or anything else.
//!
//! # Example: closure-backed authority
//!
//! ```ignore
//! use authz_gate::authority::{authority_fn, PermissionSet};
//!
//! let authority = authority_fn(|query| async move {
//!     Ok(PermissionSet::granted(query.sub_context, query.permissions))
//! });
//! ```

mod http;

pub use http::HttpPermissionAuthority;

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::core::AuthorityError;

/// A single lookup sent to the authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionQuery {
    /// Session of the caller
    pub session_id: String,
    /// Named scope qualifying the lookup
    pub sub_context: String,
    /// Permission names to resolve
    pub permissions: BTreeSet<String>,
}

impl PermissionQuery {
    /// Create a new query
    pub fn new(
        session_id: impl Into<String>,
        sub_context: impl Into<String>,
        permissions: BTreeSet<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            sub_context: sub_context.into(),
            permissions,
        }
    }
}

/// Permissions resolved by the authority for one lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Sub-context the lookup was evaluated in
    #[serde(default)]
    pub context: String,
    /// Permissions the caller holds
    #[serde(default)]
    pub authorized: BTreeSet<String>,
    /// Permissions explicitly denied (reported, not used for decisions)
    #[serde(default)]
    pub denied: BTreeSet<String>,
}

impl PermissionSet {
    /// Create a permission set
    pub fn new(
        context: impl Into<String>,
        authorized: BTreeSet<String>,
        denied: BTreeSet<String>,
    ) -> Self {
        Self {
            context: context.into(),
            authorized,
            denied,
        }
    }

    /// A result granting exactly the given permissions
    pub fn granted(context: impl Into<String>, authorized: BTreeSet<String>) -> Self {
        Self::new(context, authorized, BTreeSet::new())
    }

    /// Check if any of the candidates is authorized
    pub fn authorizes_any(&self, candidates: &BTreeSet<String>) -> bool {
        self.authorized.iter().any(|p| candidates.contains(p))
    }
}

/// Boxed future returned by [`PermissionAuthority::is_authorized`]
pub type PermissionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<PermissionSet, AuthorityError>> + Send + 'a>>;

/// External service resolving which permissions a session holds
pub trait PermissionAuthority: Send + Sync {
    /// Resolve the candidate permissions of a query
    fn is_authorized(&self, query: PermissionQuery) -> PermissionFuture<'_>;
}

/// Wrapper to implement PermissionAuthority for async closures
pub struct FnAuthority<F> {
    func: F,
}

impl<F, Fut> PermissionAuthority for FnAuthority<F>
where
    F: Fn(PermissionQuery) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PermissionSet, AuthorityError>> + Send + 'static,
{
    fn is_authorized(&self, query: PermissionQuery) -> PermissionFuture<'_> {
        Box::pin((self.func)(query))
    }
}

/// Create an authority from an async closure
pub fn authority_fn<F, Fut>(func: F) -> FnAuthority<F>
where
    F: Fn(PermissionQuery) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PermissionSet, AuthorityError>> + Send + 'static,
{
    FnAuthority { func }
}
