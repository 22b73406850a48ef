use http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::warn;

use crate::context::Context;
use crate::error::Error;
use crate::handler::Result;
use crate::middleware::{Middleware, Next};
use crate::reply::Reply;
use crate::request::Request;

/// Enforce that the handlers nested inside respond within a specified
/// duration.
///
/// If the timeout expires before a reply is produced, the inner call is
/// dropped and a fault is raised. Use one of the `or_*` methods to respond
/// with a status code or a fallback reply instead.
///
/// # Example
///
/// ```
/// use fernie::builtin::Timeout;
/// use fernie::{Context, Request, leaf, stack};
/// use std::time::Duration;
///
/// async fn slow(_: Context, _: Request) -> fernie::Result {
///     tokio::time::sleep(Duration::from_secs(11)).await;
///     Ok("Hello, world!".into())
/// }
///
/// let tree = stack()
///     .with(Timeout::from_secs(10).or_gateway_timeout())
///     .to(leaf(slow));
/// # drop(tree);
/// ```
///
pub struct Timeout {
    duration: Duration,
    or_else: OrElse,
}

enum OrElse {
    Fallback(Arc<dyn Fn() -> Result + Send + Sync>),
    Status(StatusCode),
    Raise,
}

impl Clone for OrElse {
    fn clone(&self) -> Self {
        match *self {
            Self::Fallback(ref f) => Self::Fallback(Arc::clone(f)),
            Self::Status(status) => Self::Status(status),
            Self::Raise => Self::Raise,
        }
    }
}

impl Timeout {
    /// Create a `Timeout` middleware from the duration provided.
    ///
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            or_else: OrElse::Raise,
        }
    }

    /// Create a `Timeout` middleware with the provided duration in seconds.
    ///
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// If the timeout expires, call the provided closure to produce a reply.
    ///
    /// ```
    /// use fernie::Reply;
    /// use fernie::builtin::Timeout;
    ///
    /// let timeout = Timeout::from_secs(10).or_else(|| {
    ///     Ok(Reply::status(503).with_body("Request timed out. Please try again later."))
    /// });
    /// # drop(timeout);
    /// ```
    ///
    pub fn or_else<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result + Send + Sync + 'static,
    {
        self.or_else = OrElse::Fallback(Arc::new(f));
        self
    }

    /// If the timeout expires, respond with a `504 Gateway Timeout` status
    /// code.
    ///
    /// A `504` status code typically indicates that an upstream dependency is
    /// unresponsive.
    ///
    pub fn or_gateway_timeout(self) -> Self {
        self.or_status(StatusCode::GATEWAY_TIMEOUT)
    }

    /// If the timeout expires, respond with a `503 Service Unavailable` status
    /// code.
    ///
    pub fn or_service_unavailable(self) -> Self {
        self.or_status(StatusCode::SERVICE_UNAVAILABLE)
    }

    /// If the timeout expires, respond with the provided status code and an
    /// empty body.
    ///
    pub fn or_status(mut self, status: StatusCode) -> Self {
        self.or_else = OrElse::Status(status);
        self
    }
}

impl<State> Middleware<State> for Timeout
where
    State: Send + Sync + 'static,
{
    fn wrap(&self, next: Next<State>) -> Next<State> {
        let duration = self.duration;
        let or_else = self.or_else.clone();

        Next::new(move |cx: Context<State>, request: Request| {
            let future = next.call(cx, request);
            let or_else = or_else.clone();

            async move {
                let elapsed = match time::timeout(duration, future).await {
                    Ok(result) => return result,
                    Err(elapsed) => elapsed,
                };

                warn!(?duration, "request timed out");

                match or_else {
                    OrElse::Fallback(f) => f(),
                    OrElse::Status(status) => Ok(Reply::from(status)),
                    OrElse::Raise => Err(Error::from(elapsed)),
                }
            }
        })
    }
}
