//! Operation registry
//!
//! Holds operations by name and dispatches calls through the enforcer.
//! Gating is declarative: an operation that returns a descriptor from
//! `permission_required` is checked before every call.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::enforcer::Enforcer;
use super::operation::Operation;
use crate::core::AuthError;

/// Errors from [`OperationRegistry::dispatch`]
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    /// The call was rejected before the operation ran
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The operation ran and failed
    #[error(transparent)]
    Operation(#[from] anyhow::Error),
}

/// Registry that holds all protected operations
pub struct OperationRegistry {
    operations: HashMap<String, Arc<dyn Operation>>,
    enforcer: Enforcer,
}

impl OperationRegistry {
    /// Create a new empty registry
    pub fn new(enforcer: Enforcer) -> Self {
        Self {
            operations: HashMap::new(),
            enforcer,
        }
    }

    /// Register an operation
    pub fn register<O: Operation + 'static>(&mut self, operation: O) {
        let name = operation.name().to_string();
        match operation.permission_required() {
            Some(descriptor) => tracing::info!(
                "Registering operation: {} (requires {:?})",
                name,
                descriptor.permissions()
            ),
            None => tracing::info!("Registering operation: {} (ungated)", name),
        }
        self.operations.insert(name, Arc::new(operation));
    }

    /// Get an operation by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.operations.get(name).cloned()
    }

    /// Enforce the operation's declared permissions, then execute it
    pub async fn dispatch(&self, name: &str, input: &Value) -> Result<Value, DispatchError> {
        let operation = self
            .get(name)
            .ok_or_else(|| DispatchError::OperationNotFound(name.to_string()))?;

        if let Some(descriptor) = operation.permission_required() {
            if let Err(e) = self.enforcer.enforce(descriptor).await {
                tracing::info!("[OperationRegistry] '{}' rejected: {}", name, e);
                return Err(e.into());
            }
        }

        tracing::debug!("[OperationRegistry] Executing '{}'", name);
        Ok(operation.execute(input).await?)
    }

    /// Get the number of registered operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Get names of all registered operations, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}
