//! Authorization filters
//!
//! An ordered chain of independent strategies evaluated against a shared
//! [`AuthorizationContext`](crate::core::AuthorizationContext). The first
//! filter that renders a verdict ends the walk; when every filter defers the
//! chain denies.
//!
//! # Example
//!
//! ```ignore
//! use authz_gate::filters::{FilterChain, RemoteAuthorityFilter, SessionOnlyFilter};
//!
//! let chain = FilterChain::builder()
//!     .filter(SessionOnlyFilter::new(identity.clone(), "SessionRequired")?)
//!     .filter(RemoteAuthorityFilter::new(
//!         identity,
//!         authority,
//!         "FSMessagingDefaultContext",
//!         ["UserMessagingAdminRole"],
//!     )?)
//!     .build();
//! ```
//!
//! # Ordering
//!
//! | Position | Filter | Verdict |
//! |----------|--------|---------|
//! | 1 | `SessionOnlyFilter` | `Unauthenticated` error, grant, or defer |
//! | 2 | `RemoteAuthorityFilter` | grant or defer (failures defer) |
//! | end | - | deny |

mod chain;
mod remote_authority;
mod session_only;

pub use chain::{ArcFilter, AuthorizationFilter, FilterChain, FilterChainBuilder, Next};
pub use remote_authority::RemoteAuthorityFilter;
pub use session_only::SessionOnlyFilter;
