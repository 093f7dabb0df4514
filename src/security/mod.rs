//! Security facade
//!
//! [`SecurityManager`] is the single entry point for permission decisions.
//! It owns the filter chain prototype and exposes the identity lookups the
//! enforcement layer needs.

mod manager;

pub use manager::SecurityManager;
