use std::sync::Arc;

use crate::context::Context;
use crate::handler::{BoxFuture, Result};
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// Stop processing the request if the provided precondition fails.
///
/// Guard wraps a synchronous check that receives references to the context
/// and the request. If the check returns an error, the error is raised as a
/// fault and nothing nested inside the guard runs. Pair it with an outer
/// [`rescue`](super::rescue) to map the fault to a response.
///
/// ```
/// use fernie::builtin::{guard, rescue};
/// use fernie::{Context, Reply, Request, leaf, raise, stack};
///
/// fn require_api_key(_: &Context, request: &Request) -> fernie::Result<()> {
///     if request.headers().get("x-api-key").is_none() {
///         raise!(message = "missing required header: x-api-key");
///     }
///
///     Ok(())
/// }
///
/// let tree = stack()
///     .with(rescue(|_, _| Ok(Reply::status(401))))
///     .with(guard(require_api_key))
///     .to(leaf(fernie::handler::respond("secret")));
/// # drop(tree);
/// ```
///
pub struct Guard<F> {
    check: Arc<F>,
}

pub fn guard<State, F>(check: F) -> Guard<F>
where
    F: Fn(&Context<State>, &Request) -> Result<()> + Send + Sync + 'static,
{
    Guard {
        check: Arc::new(check),
    }
}

impl<State, F> Middleware<State> for Guard<F>
where
    State: Send + Sync + 'static,
    F: Fn(&Context<State>, &Request) -> Result<()> + Send + Sync + 'static,
{
    fn wrap(&self, next: Next<State>) -> Next<State> {
        let check = Arc::clone(&self.check);

        Next::new(move |cx: Context<State>, request: Request| -> BoxFuture {
            if let Err(error) = check(&cx, &request) {
                Box::pin(async { Err(error) })
            } else {
                next.call(cx, request)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, Method, StatusCode, Uri};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::guard;
    use crate::builtin::rescue;
    use crate::handler::from_fn;
    use crate::{Context, Error, Reply, Request, ResponseSpec, Router, leaf, stack};

    fn require_key(_: &Context, request: &Request) -> crate::Result<()> {
        match request.headers().get("x-api-key") {
            Some(_) => Ok(()),
            None => Err(Error::new("missing api key")),
        }
    }

    #[tokio::test]
    async fn test_guard_refuses_to_call_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new(
            stack()
                .with(rescue(|_, _| Ok(Reply::status(401))))
                .with(guard(require_key))
                .to(leaf(from_fn({
                    let calls = Arc::clone(&calls);
                    move |_: &Context, _: &Request| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok("secret".into())
                    }
                }))),
        );

        let denied = router
            .dispatch(Request::new(Method::GET, Uri::from_static("/")))
            .await
            .unwrap();

        assert_eq!(denied, ResponseSpec::new(StatusCode::UNAUTHORIZED, ""));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let mut request = Request::new(Method::GET, Uri::from_static("/"));
        request
            .headers_mut()
            .insert("x-api-key", HeaderValue::from_static("key"));

        let allowed = router.dispatch(request).await.unwrap();

        assert_eq!(allowed, ResponseSpec::new(StatusCode::OK, "secret"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
