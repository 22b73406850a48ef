use std::sync::Arc;
use tracing::debug;

use crate::context::Context;
use crate::error::Error;
use crate::handler::Result;
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// A middleware that intercepts faults. See [`rescue`].
///
pub struct Rescue<F> {
    recover: Arc<F>,
}

/// Returns a middleware that catches faults raised by everything nested
/// inside of it and calls `recover` to produce a fallback reply. Think of
/// this as a [`Result::or_else`] for middleware.
///
/// Faults raised by middleware declared before the rescue in the same stack
/// are not intercepted.
///
/// ```
/// use fernie::builtin::rescue;
/// use fernie::{Reply, stack};
/// # use fernie::{Context, Request, leaf};
/// # async fn create(_: Context, _: Request) -> fernie::Result {
/// #     Err(fernie::Error::new("Another error"))
/// # }
///
/// let tree = stack()
///     .with(rescue(|_, error| {
///         if error.is_contract_violation() {
///             Err(error)
///         } else {
///             Ok(Reply::status(401))
///         }
///     }))
///     .to(leaf(create));
/// # drop(tree);
/// ```
///
pub fn rescue<State, F>(recover: F) -> Rescue<F>
where
    F: Fn(&Context<State>, Error) -> Result + Send + Sync + 'static,
{
    Rescue {
        recover: Arc::new(recover),
    }
}

impl<State, F> Middleware<State> for Rescue<F>
where
    State: Send + Sync + 'static,
    F: Fn(&Context<State>, Error) -> Result + Send + Sync + 'static,
{
    fn wrap(&self, next: Next<State>) -> Next<State> {
        let recover = Arc::clone(&self.recover);

        Next::new(move |cx: Context<State>, request: Request| {
            let recover = Arc::clone(&recover);
            let next = next.clone();

            async move {
                let fallback = cx.clone();

                next.call(cx, request).await.or_else(|error| {
                    debug!(error = %error, "rescued a fault");
                    recover(&fallback, error)
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode, Uri};
    use std::sync::{Arc, Mutex};

    use super::rescue;
    use crate::handler::from_fn;
    use crate::{Context, Error, Next, Reply, Request, ResponseSpec, Router, leaf, stack};

    fn request() -> Request {
        Request::new(Method::GET, Uri::from_static("/"))
    }

    fn failing() -> crate::Route {
        leaf(from_fn(|_: &Context, _: &Request| Err(Error::new("Sample error"))))
    }

    #[tokio::test]
    async fn test_rescue_replaces_fault() {
        let seen = Arc::new(Mutex::new(None));
        let router = Router::new(
            stack()
                .with(rescue({
                    let seen = Arc::clone(&seen);
                    move |_, error: Error| {
                        *seen.lock().unwrap() = Some(error.to_string());
                        Ok(Reply::status(401))
                    }
                }))
                .to(failing()),
        );

        let response = router.dispatch(request()).await.unwrap();

        assert_eq!(response, ResponseSpec::new(StatusCode::UNAUTHORIZED, ""));
        assert_eq!(seen.lock().unwrap().as_deref(), Some("Sample error"));
    }

    #[tokio::test]
    async fn test_rescue_does_not_catch_outer_faults() {
        let router = Router::new(
            stack()
                .with(|_: Next| {
                    Next::new(from_fn(|_: &Context, _: &Request| {
                        Err(Error::new("raised before the rescue"))
                    }))
                })
                .with(rescue(|_, _| Ok(Reply::status(500))))
                .to(leaf(crate::handler::respond("unreachable"))),
        );

        let error = router.dispatch(request()).await.unwrap_err();

        assert_eq!(error.to_string(), "raised before the rescue");
    }

    #[tokio::test]
    async fn test_rescue_can_rethrow() {
        let router = Router::new(stack().with(rescue(|_, error| Err(error))).to(failing()));
        let error = router.dispatch(request()).await.unwrap_err();

        assert_eq!(error.to_string(), "Sample error");
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let router = Router::new(
            stack()
                .with(rescue(|_, _| Ok(Reply::status(500))))
                .to(leaf(crate::handler::respond("fine"))),
        );

        let response = router.dispatch(request()).await.unwrap();

        assert_eq!(response, ResponseSpec::new(StatusCode::OK, "fine"));
    }
}
