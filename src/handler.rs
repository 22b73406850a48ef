//! Leaf handlers.
//!

use std::future::Future;
use std::pin::Pin;

use crate::context::Context;
use crate::error::Error;
use crate::reply::Reply;
use crate::request::Request;

/// An alias for the pinned, boxed future returned by a [`Handler`].
///
pub type BoxFuture<T = Result> = Pin<Box<dyn Future<Output = T> + Send>>;

/// An alias for results that uses the [`Error`] struct defined in this crate.
///
pub type Result<T = Reply> = std::result::Result<T, Error>;

/// A callable that produces a [`Reply`] from a context and a request.
///
/// `Handler` is implemented for async functions and closures with the
/// signature `Fn(Context<State>, Request) -> impl Future<Output = Result>`.
///
/// ```
/// use fernie::{Context, Request};
///
/// async fn hello(cx: Context, _: Request) -> fernie::Result {
///     let name = cx.param("name").decode()?;
///     Ok(format!("Hello, {}!", name).into())
/// }
///
/// let router = fernie::Router::new(fernie::paths().at("/hello/:name", fernie::leaf(hello)));
/// # drop(router);
/// ```
///
pub trait Handler<State>: Send + Sync {
    fn call(&self, cx: Context<State>, request: Request) -> BoxFuture;
}

/// A handler that runs a synchronous closure. See [`from_fn`].
///
pub struct FromFn<F> {
    f: F,
}

/// A handler that always responds with a clone of the same reply. See
/// [`respond`].
///
#[derive(Clone, Debug)]
pub struct Respond {
    reply: Reply,
}

/// Adapts a synchronous closure into a [`Handler`].
///
/// The closure runs when the handler is called, so its effects are ordered
/// with respect to the pre- and post-processing of the middleware that wrap
/// it exactly as an async handler's would be.
///
pub fn from_fn<State, F>(f: F) -> FromFn<F>
where
    F: Fn(&Context<State>, &Request) -> Result + Send + Sync,
{
    FromFn { f }
}

/// Returns a handler that responds with `reply` to every request.
///
pub fn respond(reply: impl Into<Reply>) -> Respond {
    Respond {
        reply: reply.into(),
    }
}

impl<State, F, R> Handler<State> for F
where
    F: Fn(Context<State>, Request) -> R + Send + Sync,
    R: Future<Output = Result> + Send + 'static,
{
    fn call(&self, cx: Context<State>, request: Request) -> BoxFuture {
        Box::pin(self(cx, request))
    }
}

impl<State, F> Handler<State> for FromFn<F>
where
    F: Fn(&Context<State>, &Request) -> Result + Send + Sync,
{
    fn call(&self, cx: Context<State>, request: Request) -> BoxFuture {
        let result = (self.f)(&cx, &request);
        Box::pin(async { result })
    }
}

impl<State> Handler<State> for Respond {
    fn call(&self, _: Context<State>, _: Request) -> BoxFuture {
        let reply = self.reply.clone();
        Box::pin(async { Ok(reply) })
    }
}
