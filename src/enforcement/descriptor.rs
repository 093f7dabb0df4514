//! Declared permission metadata attached to an operation

use serde::{Deserialize, Serialize};

use crate::core::{AuthError, AuthResult, Permission};

/// Permissions an operation requires before it may run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPermissionRequired")]
pub struct PermissionRequired {
    permissions: Vec<Permission>,
    resolve_sub_context: bool,
}

#[derive(Deserialize)]
struct RawPermissionRequired {
    permissions: Vec<Permission>,
    #[serde(default)]
    resolve_sub_context: bool,
}

impl TryFrom<RawPermissionRequired> for PermissionRequired {
    type Error = AuthError;

    fn try_from(raw: RawPermissionRequired) -> AuthResult<Self> {
        let descriptor = Self::new(raw.permissions)?;
        Ok(Self {
            resolve_sub_context: raw.resolve_sub_context,
            ..descriptor
        })
    }
}

impl PermissionRequired {
    /// Declare the required permissions
    ///
    /// Fails with `InvalidArgument` if the list is empty.
    pub fn new<I, P>(permissions: I) -> AuthResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        let permissions: Vec<Permission> = permissions.into_iter().map(Into::into).collect();
        if permissions.is_empty() {
            return Err(AuthError::invalid_argument(
                "PermissionRequired needs at least one permission",
            ));
        }

        Ok(Self {
            permissions,
            resolve_sub_context: false,
        })
    }

    /// Also read the caller's session sub-context and use it for remote lookups
    pub fn with_sub_context_resolution(mut self) -> Self {
        self.resolve_sub_context = true;
        self
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn resolve_sub_context(&self) -> bool {
        self.resolve_sub_context
    }
}
