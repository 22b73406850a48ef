//! Serve a [`Router`](crate::Router) over HTTP/1.1.
//!
//! The server is the fault boundary of the crate. A fault that escapes the
//! router is logged and answered with a `500 Internal Server Error` with an
//! empty body.
//!

mod accept;
mod server;
mod service;
mod shutdown;

pub use server::Server;
pub use service::RouterService;
pub use shutdown::ctrl_c;
