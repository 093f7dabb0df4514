//! Filter chain
//!
//! Contains:
//! - `AuthorizationFilter` trait - one authorization strategy
//! - `Next` - handle on the rest of the chain for a single decision
//! - `FilterChain` - immutable ordered prototype built at startup

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{AuthResult, AuthorizationContext};

/// Trait for authorization strategies
///
/// A filter either renders a final verdict or delegates to `next`. Filters
/// hold only immutable configuration; per-decision state lives in the
/// context's attribute bag.
#[async_trait]
pub trait AuthorizationFilter: Send + Sync {
    /// Name of this filter (for logging)
    fn name(&self) -> &str;

    /// Evaluate the context, delegating to `next` when this filter has no opinion
    async fn is_authorized(
        &self,
        next: Next<'_>,
        context: &mut AuthorizationContext,
    ) -> AuthResult<bool>;
}

/// Type alias for stored filters
pub type ArcFilter = Arc<dyn AuthorizationFilter>;

/// The filters remaining after the current one
///
/// Chain position is tracked per call, so concurrent decisions over the same
/// prototype never share mutable state.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    remaining: &'a [ArcFilter],
}

impl<'a> Next<'a> {
    /// A chain position with no filters left
    pub fn end() -> Next<'static> {
        Next { remaining: &[] }
    }

    /// Run the next filter, or deny when the chain is exhausted
    pub async fn is_authorized(self, context: &mut AuthorizationContext) -> AuthResult<bool> {
        match self.remaining.split_first() {
            Some((filter, rest)) => {
                tracing::debug!("[FilterChain] Evaluating filter '{}'", filter.name());
                filter.is_authorized(Next { remaining: rest }, context).await
            }
            None => {
                tracing::debug!("[FilterChain] Chain exhausted, denying");
                Ok(false)
            }
        }
    }

    /// Number of filters left
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.remaining.len())
            .finish()
    }
}

/// Ordered, immutable sequence of filters
///
/// Cloning is cheap; clones share the same filter instances.
#[derive(Clone)]
pub struct FilterChain {
    filters: Arc<[ArcFilter]>,
}

impl FilterChain {
    /// Create a chain from filters in evaluation order
    pub fn new(filters: Vec<ArcFilter>) -> Self {
        Self {
            filters: filters.into(),
        }
    }

    /// Start a builder
    pub fn builder() -> FilterChainBuilder {
        FilterChainBuilder::default()
    }

    /// Walk the chain from the first filter
    pub async fn is_authorized(&self, context: &mut AuthorizationContext) -> AuthResult<bool> {
        Next {
            remaining: &self.filters[..],
        }
        .is_authorized(context)
        .await
    }

    /// Get the number of filters in the chain
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Get the names of all filters in the chain
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Collects filters before freezing them into a [`FilterChain`]
#[derive(Default)]
pub struct FilterChainBuilder {
    filters: Vec<ArcFilter>,
}

impl FilterChainBuilder {
    /// Append a filter
    pub fn filter<F: AuthorizationFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append a shared filter
    pub fn shared(mut self, filter: ArcFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Freeze the chain
    pub fn build(self) -> FilterChain {
        tracing::info!(
            "[FilterChain] Initialized with {} filter(s)",
            self.filters.len()
        );
        FilterChain::new(self.filters)
    }
}
