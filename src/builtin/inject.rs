use std::sync::Arc;

use crate::context::Context;
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// A middleware that merges a value into the context. See [`inject`].
///
pub struct Inject<F> {
    produce: Arc<F>,
}

/// Returns a middleware that calls `produce` for each request and passes a
/// new context with the returned value merged in to the handler it wraps.
///
/// The incoming context is not modified. Code that still holds it after the
/// middleware returns does not observe the injected value.
///
/// ```
/// use fernie::builtin::inject;
/// use fernie::{Context, Request, leaf, stack};
///
/// #[derive(Clone)]
/// struct User(String);
///
/// async fn whoami(cx: Context, _: Request) -> fernie::Result {
///     Ok(cx.get::<User>().map_or("anonymous", |user| user.0.as_str()).into())
/// }
///
/// let tree = stack()
///     .with(inject(|_, _| User("test user".to_owned())))
///     .to(leaf(whoami));
/// # drop(tree);
/// ```
///
pub fn inject<State, T, F>(produce: F) -> Inject<F>
where
    F: Fn(&Context<State>, &Request) -> T + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    Inject {
        produce: Arc::new(produce),
    }
}

impl<State, T, F> Middleware<State> for Inject<F>
where
    State: Send + Sync + 'static,
    F: Fn(&Context<State>, &Request) -> T + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn wrap(&self, next: Next<State>) -> Next<State> {
        let produce = Arc::clone(&self.produce);

        Next::new(move |cx: Context<State>, request: Request| {
            let value = produce(&cx, &request);
            next.call(cx.with(value), request)
        })
    }
}
