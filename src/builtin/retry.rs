use std::time::Duration;
use tokio::time;
use tracing::warn;

use crate::context::Context;
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// Re-invoke the handlers nested inside when they raise a fault.
///
/// Each attempt receives a clone of the original context and request. The
/// fault raised by the last attempt is returned if every attempt fails.
/// Replies, including `NotFound`, are never retried.
///
/// ```
/// use fernie::builtin::Retry;
/// use fernie::{Context, Request, leaf, stack};
/// use std::time::Duration;
///
/// async fn flaky(_: Context, _: Request) -> fernie::Result {
///     Ok("eventually".into())
/// }
///
/// let tree = stack()
///     .with(Retry::new(3).with_delay(Duration::from_millis(50)))
///     .to(leaf(flaky));
/// # drop(tree);
/// ```
///
#[derive(Clone, Copy, Debug)]
pub struct Retry {
    retries: usize,
    delay: Option<Duration>,
}

impl Retry {
    /// Retry up to `retries` times after the first attempt.
    ///
    pub fn new(retries: usize) -> Self {
        Self {
            retries,
            delay: None,
        }
    }

    /// Wait `delay` before each retry.
    ///
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl<State> Middleware<State> for Retry
where
    State: Send + Sync + 'static,
{
    fn wrap(&self, next: Next<State>) -> Next<State> {
        let Self { retries, delay } = *self;

        Next::new(move |cx: Context<State>, request: Request| {
            let next = next.clone();

            async move {
                let mut attempt = 0;

                loop {
                    let error = match next.call(cx.clone(), request.clone()).await {
                        Ok(reply) => return Ok(reply),
                        Err(error) => error,
                    };

                    if attempt == retries {
                        return Err(error);
                    }

                    attempt += 1;
                    warn!(%error, attempt, retries, "retrying after a fault");

                    if let Some(delay) = delay {
                        time::sleep(delay).await;
                    }
                }
            }
        })
    }
}
