//! Core types for the authorization layer
//!
//! This module provides the fundamental types used throughout the crate:
//! - `AuthorizationContext` - Per-decision permissions and attributes
//! - `Permission` / `MessagingPermission` - Permission identifiers
//! - `AuthError` / `AuthorityError` - Error types

pub mod context;
pub mod error;
pub mod permission;

pub use context::{AttributeMap, AuthorizationContext, SUB_CONTEXT_KEY};
pub use error::{AuthError, AuthResult, AuthorityError, UNAUTHORIZED_MESSAGE};
pub use permission::{MessagingPermission, Permission};
