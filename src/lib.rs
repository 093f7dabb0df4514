pub mod core;
pub mod filters;
pub mod security;

// Collaborators consumed by the decision pipeline
pub mod authority;
pub mod identity;

// Declarative gating of operations
pub mod enforcement;

// Startup wiring
pub mod config;
pub mod logging;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::config::AuthorizationConfig;
pub use crate::core::{AuthError, AuthResult, AuthorizationContext, MessagingPermission, Permission};
pub use crate::enforcement::{Enforcer, Operation, OperationRegistry, PermissionRequired};
pub use crate::security::SecurityManager;
