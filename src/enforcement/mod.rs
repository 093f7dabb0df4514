//! Declarative enforcement
//!
//! Operations declare the permissions they need with a
//! [`PermissionRequired`] descriptor. The [`Enforcer`] evaluates that
//! descriptor before the call and never alters the call's input or output.
//!
//! ```text
//! dispatch(name, input)
//!   -> Enforcer::enforce(descriptor)
//!        session present?        no  -> Unauthenticated
//!        resolve sub-context?    yes -> read session sub-context
//!        SecurityManager::is_authorized
//!                                no  -> Unauthorized
//!   -> Operation::execute(input)
//! ```

mod descriptor;
mod enforcer;
mod operation;
mod registry;

pub use descriptor::PermissionRequired;
pub use enforcer::{Enforcer, NO_SESSION_MESSAGE};
pub use operation::Operation;
pub use registry::{DispatchError, OperationRegistry};
