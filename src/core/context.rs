//! Authorization context - per-decision state walked through the filter chain

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use super::error::{AuthError, AuthResult};
use super::permission::Permission;

/// Attribute key holding a sub-context that overrides a filter's default
pub const SUB_CONTEXT_KEY: &str = "authorization.sub_context";

// ============================================================================
// AttributeMap - string-keyed bag of typed values
// ============================================================================

/// String-keyed container for arbitrary typed values
///
/// Filters use it to pass side-channel data forward through the chain.
/// Values are stored behind `Arc`, so reading never needs `Clone` on `T`.
#[derive(Default, Clone)]
pub struct AttributeMap {
    map: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl AttributeMap {
    /// Create a new empty attribute map
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Store a value, replacing whatever the key held before
    pub fn insert<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.map.insert(key.into(), Arc::new(value));
    }

    /// Get a value by key if it exists and has type `T`
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.map
            .get(key)
            .and_then(|value| value.clone().downcast::<T>().ok())
    }

    /// Get the untyped value stored under a key
    pub fn get_any(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.map.get(key).map(|value| value.as_ref())
    }

    /// Check if a key is set, regardless of its type
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Remove a key
    pub fn remove(&mut self, key: &str) -> bool {
        self.map.remove(key).is_some()
    }

    /// Number of attributes stored
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if no attributes are stored
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Attribute keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.map.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for AttributeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeMap")
            .field("keys", &self.keys())
            .finish()
    }
}

// ============================================================================
// AuthorizationContext
// ============================================================================

/// Permissions required by the current operation plus an attribute bag
///
/// Created per request right before the decision pipeline runs and dropped
/// once the decision is rendered. The permission list is fixed at creation.
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    permissions: Vec<Permission>,
    attributes: AttributeMap,
}

impl AuthorizationContext {
    /// Create a context for the given required permissions
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
                "AuthorizationContext requires at least one permission",
            ));
        }

        Ok(Self {
            permissions,
            attributes: AttributeMap::new(),
        })
    }

    /// Required permissions, in declaration order
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Required permission names, for membership tests
    pub fn permission_names(&self) -> BTreeSet<&str> {
        self.permissions.iter().map(|p| p.name()).collect()
    }

    /// Check if a permission name is among the required ones
    pub fn requires(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p.name() == name)
    }

    // --- Attribute Methods ---

    /// Store an attribute value
    pub fn put<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.attributes.insert(key, value);
    }

    /// Get an attribute value of type `T`; absent if unset or of another type
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.attributes.get::<T>(key)
    }

    /// Check if an attribute is set
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains(key)
    }

    /// Read-only access to the attribute bag
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Record a sub-context that overrides filter defaults
    pub fn set_sub_context(&mut self, sub_context: impl Into<String>) {
        self.put(SUB_CONTEXT_KEY, sub_context.into());
    }

    /// The overriding sub-context, if one was recorded
    pub fn sub_context(&self) -> Option<Arc<String>> {
        self.get::<String>(SUB_CONTEXT_KEY)
    }
}
