//! Operation trait definition
//!
//! Protected endpoints implement this trait and declare their permission
//! metadata; the registry gates them before `execute` runs.

use async_trait::async_trait;
use serde_json::Value;

use super::descriptor::PermissionRequired;

/// Trait for operations dispatched through the registry
#[async_trait]
pub trait Operation: Send + Sync {
    /// Get the name of this operation
    fn name(&self) -> &str;

    /// Permissions this operation declares
    ///
    /// `None` means the operation is not gated. Default is `None`.
    fn permission_required(&self) -> Option<&PermissionRequired> {
        None
    }

    /// Execute the operation with the given input
    async fn execute(&self, input: &Value) -> anyhow::Result<Value>;
}
