use http::Method;
use std::sync::Arc;
use tracing::debug;

use crate::context::Context;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::reply::Reply;
use crate::request::Request;

/// A middleware that responds with `405 Method Not Allowed` to methods
/// outside of an allow list. See [`method_not_allowed`].
///
pub struct Allow {
    allowed: Arc<[Method]>,
}

/// Returns a middleware that refuses requests whose method is not in
/// `allowed` with a `405` reply whose body lists the allowed methods.
///
/// A method branch treats an undeclared method as "not found". Wrap a leaf
/// that serves several methods with this middleware when a `405` is the
/// desired outcome instead.
///
/// ```
/// use fernie::builtin::method_not_allowed;
/// use fernie::http::Method;
/// use fernie::{Context, Request, leaf, paths, stack};
///
/// async fn upsert(_: Context, request: Request) -> fernie::Result {
///     Ok(format!("{} accepted", request.method()).into())
/// }
///
/// let tree = paths().at(
///     "/two",
///     stack()
///         .with(method_not_allowed([Method::POST, Method::PUT]))
///         .to(leaf(upsert)),
/// );
/// # drop(tree);
/// ```
///
pub fn method_not_allowed<I>(allowed: I) -> Allow
where
    I: IntoIterator<Item = Method>,
{
    Allow {
        allowed: allowed.into_iter().collect(),
    }
}

impl Allow {
    fn allow_list(&self) -> String {
        self.allowed.iter().fold(String::new(), |list, method| {
            if list.is_empty() {
                method.as_str().to_owned()
            } else {
                list + ", " + method.as_str()
            }
        })
    }
}

impl<State> Middleware<State> for Allow
where
    State: Send + Sync + 'static,
{
    fn wrap(&self, next: Next<State>) -> Next<State> {
        let allowed = Arc::clone(&self.allowed);
        let allow_list = self.allow_list();

        Next::new(move |cx: Context<State>, request: Request| -> BoxFuture {
            if allowed.contains(request.method()) {
                return next.call(cx, request);
            }

            debug!(method = %request.method(), allow = %allow_list, "method not allowed");
            let reply = Reply::status(405).with_body(allow_list.clone());
            Box::pin(async { Ok(reply) })
        })
    }
}
