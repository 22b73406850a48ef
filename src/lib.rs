//! A declarative request router with onion-style middleware composition.
//!
//! A route tree is built once from four kinds of nodes: leaf handlers, path
//! branches, method branches, and middleware stacks. For each request, the
//! [`Router`] descends the tree, composes the middleware gathered on the way
//! down around the leaf it reaches, invokes the result, and normalizes the
//! returned [`Reply`] into a status code and a body.
//!
//! ```
//! use fernie::builtin::{inject, rescue};
//! use fernie::http::Method;
//! use fernie::{Context, Error, Reply, Request, Router, get, leaf, paths, stack};
//!
//! #[derive(Clone)]
//! struct User(&'static str);
//!
//! async fn show(cx: Context, _: Request) -> fernie::Result {
//!     Ok(cx.get::<User>().map_or("anonymous", |user| user.0).into())
//! }
//!
//! async fn destroy(_: Context, _: Request) -> fernie::Result {
//!     Err(Error::new("Sample error"))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Error> {
//! let router = Router::new(
//!     paths().at(
//!         "/test",
//!         stack()
//!             .with(rescue(|_, _| Ok(Reply::status(404))))
//!             .with(inject(|_, _| User("test user")))
//!             .to(get(leaf(show)).delete(leaf(destroy))),
//!     ),
//! );
//!
//! let request = Request::new(Method::GET, "/test".parse()?);
//! let response = router.dispatch(request).await?;
//!
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body(), "test user");
//! # Ok(())
//! # }
//! ```
//!

#![forbid(unsafe_code)]

pub mod builtin;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod server;

mod context;
mod reply;
mod request;
mod route;
mod router;
mod sink;

pub use fernie_router::{PathParams, Pattern, PatternError};
pub use http;

pub use context::{Context, Param, Routing};
pub use error::{BoxError, Error};
pub use handler::{BoxFuture, Handler, Result};
pub use middleware::{Middleware, Next, compose};
pub use reply::{Reply, ResponseSpec};
pub use request::Request;
pub use route::{
    Methods, Paths, Route, Stack, delete, get, head, leaf, methods, options, patch, paths, post,
    put, stack,
};
pub use router::{Resolution, Router};
pub use server::Server;
pub use sink::Sink;
