//! Permission identifiers
//!
//! A [`Permission`] is an opaque name compared by string equality only.
//! [`MessagingPermission`] is the closed catalog used by the messaging
//! deployment; any other catalog can convert into [`Permission`] the same way.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Named capability required to perform an operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Create a permission from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The permission name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Permission::new(name)
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Permission(name)
    }
}

/// Permissions protecting the messaging resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessagingPermission {
    // FSMessagingDefaultContext
    FSMessagingFullAccessUserRole,
    FSMessagingFullTimeAdminRole,

    // FSMessagingSupportAdminContext
    /// View a thread through the admin API
    FSMessagingAdminApiViewThread,
    /// Modify a thread through the admin API
    FSMessagingAdminApiModifyThread,
    /// Modify a thread
    FSMessagingModifyThread,
    /// Any authenticated session is enough
    SessionRequired,

    // UserMessagingContext
    MessagingClientRole,
    UserMessagingAdminRole,
}

impl MessagingPermission {
    /// Every variant, in declaration order
    pub const ALL: [MessagingPermission; 8] = [
        MessagingPermission::FSMessagingFullAccessUserRole,
        MessagingPermission::FSMessagingFullTimeAdminRole,
        MessagingPermission::FSMessagingAdminApiViewThread,
        MessagingPermission::FSMessagingAdminApiModifyThread,
        MessagingPermission::FSMessagingModifyThread,
        MessagingPermission::SessionRequired,
        MessagingPermission::MessagingClientRole,
        MessagingPermission::UserMessagingAdminRole,
    ];

    /// The variant name, which is also the permission name
    pub fn name(&self) -> &'static str {
        match self {
            MessagingPermission::FSMessagingFullAccessUserRole => "FSMessagingFullAccessUserRole",
            MessagingPermission::FSMessagingFullTimeAdminRole => "FSMessagingFullTimeAdminRole",
            MessagingPermission::FSMessagingAdminApiViewThread => "FSMessagingAdminApiViewThread",
            MessagingPermission::FSMessagingAdminApiModifyThread => {
                "FSMessagingAdminApiModifyThread"
            }
            MessagingPermission::FSMessagingModifyThread => "FSMessagingModifyThread",
            MessagingPermission::SessionRequired => "SessionRequired",
            MessagingPermission::MessagingClientRole => "MessagingClientRole",
            MessagingPermission::UserMessagingAdminRole => "UserMessagingAdminRole",
        }
    }
}

impl fmt::Display for MessagingPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MessagingPermission {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessagingPermission::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| AuthError::invalid_argument(format!("Unknown permission: {}", s)))
    }
}

impl From<MessagingPermission> for Permission {
    fn from(permission: MessagingPermission) -> Self {
        Permission::new(permission.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_equality_is_by_name() {
        let a = Permission::new("AdminRole");
        let b: Permission = "AdminRole".into();
        assert_eq!(a, b);
        assert_ne!(a, Permission::new("adminrole"));
    }

    #[test]
    fn test_messaging_permission_names() {
        assert_eq!(MessagingPermission::SessionRequired.name(), "SessionRequired");
        let p: Permission = MessagingPermission::UserMessagingAdminRole.into();
        assert_eq!(p.name(), "UserMessagingAdminRole");
    }

    #[test]
    fn test_parse_catalog() {
        for permission in MessagingPermission::ALL {
            assert_eq!(permission.name().parse::<MessagingPermission>(), Ok(permission));
        }
        assert!(matches!(
            "NotAPermission".parse::<MessagingPermission>(),
            Err(AuthError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_permission_serializes_as_string() {
        let p = Permission::new("SessionRequired");
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"SessionRequired\"");
        let parsed: Permission = serde_json::from_str("\"MessagingClientRole\"").unwrap();
        assert_eq!(parsed.name(), "MessagingClientRole");
    }
}
