//! Middleware and the composition of middleware around a leaf handler.
//!
//! A [`Middleware`] wraps one handler into another with the same signature.
//! Given the list `[m1, m2, ..., mN]` and a leaf handler `h`, [`compose`]
//! produces the handler `m1(m2(...(mN(h))...))`. When it is called, the code
//! that `m1` runs before calling through runs first and the code it runs
//! after calling through runs last.
//!
//! ```
//! use fernie::middleware::{self, Next};
//! use fernie::{Context, Request};
//!
//! let logger = middleware::around(|cx: Context, request: Request, next: Next| async move {
//!     println!("-> {} {}", request.method(), request.path());
//!     next.call(cx, request).await.inspect(|reply| {
//!         println!("<- {:?}", reply);
//!     })
//! });
//! # drop(logger);
//! ```
//!

use std::future::Future;
use std::sync::Arc;

use crate::context::Context;
use crate::handler::{BoxFuture, Handler, Result};
use crate::request::Request;

/// A type-erased, cloneable handler. Middleware receive the handler they
/// wrap as a `Next` and return a new one.
///
pub struct Next<State = ()> {
    handler: Arc<dyn Handler<State>>,
}

/// Wraps a handler into another handler with the same signature.
///
/// `Middleware` is implemented for closures with the signature
/// `Fn(Next<State>) -> Next<State>`.
///
pub trait Middleware<State>: Send + Sync {
    fn wrap(&self, next: Next<State>) -> Next<State>;
}

/// A middleware built from a closure that receives the context, the request,
/// and the handler it wraps. See [`around`].
///
pub struct Around<F> {
    f: Arc<F>,
}

/// Returns a middleware that calls `f` with the context, the request, and
/// the wrapped handler every time it is invoked.
///
/// The closure may call through zero or more times, inspect or replace the
/// result, or intercept a fault.
///
pub fn around<State, F, R>(f: F) -> Around<F>
where
    F: Fn(Context<State>, Request, Next<State>) -> R + Send + Sync + 'static,
    R: Future<Output = Result> + Send + 'static,
{
    Around { f: Arc::new(f) }
}

/// Folds `middleware` around `leaf` from the right. The first middleware in
/// the list becomes the outermost layer.
///
pub fn compose<'a, State, I>(middleware: I, leaf: Next<State>) -> Next<State>
where
    State: 'a,
    I: IntoIterator<Item = &'a Arc<dyn Middleware<State>>>,
    I::IntoIter: DoubleEndedIterator,
{
    middleware
        .into_iter()
        .rev()
        .fold(leaf, |next, middleware| middleware.wrap(next))
}

impl<State> Next<State> {
    pub fn new<H>(handler: H) -> Self
    where
        H: Handler<State> + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Calls the wrapped handler.
    ///
    pub fn call(&self, cx: Context<State>, request: Request) -> BoxFuture {
        self.handler.call(cx, request)
    }
}

impl<State> Clone for Next<State> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<State, F> Middleware<State> for F
where
    F: Fn(Next<State>) -> Next<State> + Send + Sync,
{
    fn wrap(&self, next: Next<State>) -> Next<State> {
        self(next)
    }
}

impl<State, F, R> Middleware<State> for Around<F>
where
    State: 'static,
    F: Fn(Context<State>, Request, Next<State>) -> R + Send + Sync + 'static,
    R: Future<Output = Result> + Send + 'static,
{
    fn wrap(&self, next: Next<State>) -> Next<State> {
        let f = Arc::clone(&self.f);
        Next::new(move |cx: Context<State>, request: Request| f(cx, request, next.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{Middleware, Next, around, compose};
    use crate::handler::{Result, from_fn};
    use crate::{Context, Error, Reply, Request, Routing};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn context() -> Context {
        Context::new(Routing::new("/"), Arc::new(()))
    }

    fn request() -> Request {
        Request::new(http::Method::GET, http::Uri::from_static("/"))
    }

    fn marker(log: &Log, pre: &'static str, post: &'static str) -> Arc<dyn Middleware<()>> {
        let log = Arc::clone(log);

        Arc::new(around(move |cx: Context, request: Request, next: Next| {
            let log = Arc::clone(&log);

            async move {
                log.lock().unwrap().push(pre);
                let result = next.call(cx, request).await;
                log.lock().unwrap().push(post);
                result
            }
        }))
    }

    fn leaf(log: &Log) -> Next {
        let log = Arc::clone(log);

        Next::new(from_fn(move |_: &Context, _: &Request| -> Result {
            log.lock().unwrap().push("h");
            Ok("done".into())
        }))
    }

    #[tokio::test]
    async fn test_onion_order() {
        let log = Log::default();
        let middleware = [
            marker(&log, "m1-pre", "m1-post"),
            marker(&log, "m2-pre", "m2-post"),
        ];
        let next = compose(&middleware, leaf(&log));

        assert_eq!(
            next.call(context(), request()).await.unwrap(),
            Reply::from("done")
        );
        assert_eq!(
            *log.lock().unwrap(),
            ["m1-pre", "m2-pre", "h", "m2-post", "m1-post"]
        );
    }

    #[tokio::test]
    async fn test_arbitrary_length() {
        let log = Log::default();
        let middleware: Vec<_> = (0..32).map(|_| marker(&log, "pre", "post")).collect();
        let next = compose(&middleware, leaf(&log));

        next.call(context(), request()).await.unwrap();

        let log = log.lock().unwrap();

        assert_eq!(log.len(), 65);
        assert!(log[..32].iter().all(|entry| *entry == "pre"));
        assert_eq!(log[32], "h");
        assert!(log[33..].iter().all(|entry| *entry == "post"));
    }

    #[tokio::test]
    async fn test_empty_list_is_the_leaf() {
        let log = Log::default();
        let next = compose(&Vec::<Arc<dyn Middleware<()>>>::new(), leaf(&log));

        assert_eq!(
            next.call(context(), request()).await.unwrap(),
            Reply::from("done")
        );
        assert_eq!(*log.lock().unwrap(), ["h"]);
    }

    #[tokio::test]
    async fn test_closure_middleware_replaces_result() {
        let log = Log::default();
        let shout: Arc<dyn Middleware<()>> = Arc::new(|next: Next| {
            Next::new(move |cx: Context, request: Request| {
                let next = next.clone();

                async move {
                    match next.call(cx, request).await {
                        Ok(Reply::Text(text)) => Ok(Reply::Text(text.to_uppercase())),
                        other => other,
                    }
                }
            })
        });

        let next = compose([&shout], leaf(&log));

        assert_eq!(
            next.call(context(), request()).await.unwrap(),
            Reply::from("DONE")
        );
    }

    async fn forbid(_: Context, _: Request, _: Next) -> Result {
        Ok(Reply::status(403))
    }

    #[tokio::test]
    async fn test_refusing_to_call_through() {
        let log = Log::default();
        let deny: Arc<dyn Middleware<()>> = Arc::new(around(forbid));
        let middleware = [
            marker(&log, "m1-pre", "m1-post"),
            deny,
            marker(&log, "m3-pre", "m3-post"),
        ];
        let next = compose(&middleware, leaf(&log));

        assert_eq!(
            next.call(context(), request()).await.unwrap(),
            Reply::status(403)
        );
        assert_eq!(*log.lock().unwrap(), ["m1-pre", "m1-post"]);
    }

    #[tokio::test]
    async fn test_faults_pass_through_layers_that_do_not_intercept() {
        let log = Log::default();
        let middleware = [marker(&log, "m1-pre", "m1-post")];
        let failing = Next::new(from_fn(|_: &Context, _: &Request| -> Result {
            Err(Error::new("Sample error"))
        }));

        let next = compose(&middleware, failing);
        let error = next.call(context(), request()).await.unwrap_err();

        // The marker middleware passes the result through untouched.
        assert_eq!(error.to_string(), "Sample error");
        assert_eq!(*log.lock().unwrap(), ["m1-pre", "m1-post"]);
    }
}
