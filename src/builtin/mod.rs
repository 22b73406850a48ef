//! Middleware that ships with the crate.
//!
//! Every item in this module is ordinary [`Middleware`](crate::Middleware)
//! and composes with user-defined middleware in a
//! [`stack`](crate::stack) like any other.
//!

mod allow;
mod guard;
mod inject;
mod rescue;
mod retry;
mod timeout;
mod trace;

pub use allow::{Allow, method_not_allowed};
pub use guard::{Guard, guard};
pub use inject::{Inject, inject};
pub use rescue::{Rescue, rescue};
pub use retry::Retry;
pub use timeout::Timeout;
pub use trace::{Trace, trace};
