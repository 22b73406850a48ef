use std::time::Instant;
use tracing::{Instrument, Level, debug, span, warn};

use crate::context::Context;
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// A middleware that instruments each request with a `tracing` span. See
/// [`trace`].
///
#[derive(Clone, Copy, Debug)]
pub struct Trace {
    _priv: (),
}

/// Returns a middleware that opens an `INFO` span named `request` with the
/// method and path of each request, and records the outcome and latency of
/// the call when it completes.
///
pub fn trace() -> Trace {
    Trace { _priv: () }
}

impl<State> Middleware<State> for Trace
where
    State: Send + Sync + 'static,
{
    fn wrap(&self, next: Next<State>) -> Next<State> {
        Next::new(move |cx: Context<State>, request: Request| {
            let span = span!(
                Level::INFO,
                "request",
                method = %request.method(),
                path = request.path(),
            );

            let next = next.clone();

            async move {
                let started = Instant::now();
                let result = next.call(cx, request).await;
                let elapsed = started.elapsed();

                match &result {
                    Ok(reply) if reply.is_not_found() => debug!(?elapsed, "not found"),
                    Ok(_) => debug!(?elapsed, "replied"),
                    Err(error) => warn!(?elapsed, %error, "raised a fault"),
                }

                result
            }
            .instrument(span)
        })
    }
}
