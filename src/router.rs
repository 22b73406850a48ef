use http::Method;
use smallvec::SmallVec;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::context::{Context, Routing};
use crate::handler::Result;
use crate::middleware::{Middleware, Next, compose};
use crate::reply::ResponseSpec;
use crate::request::Request;
use crate::route::Route;
use crate::sink::Sink;

/// The entry point of the routing engine.
///
/// A `Router` owns an immutable route tree and the state shared by every
/// request. It holds no per-request mutable state, so a single instance can
/// dispatch any number of concurrent requests.
///
pub struct Router<State = ()> {
    root: Route<State>,
    state: Arc<State>,
}

/// The outcome of a successful descent: the leaf handler, the middleware
/// gathered on the way down in declaration order, and the routing metadata
/// as it was when the leaf was reached.
///
pub struct Resolution<'a, State> {
    routing: Routing,
    middleware: SmallVec<[&'a Arc<dyn Middleware<State>>; 8]>,
    leaf: &'a Next<State>,
}

impl Router<()> {
    pub fn new(root: impl Into<Route<()>>) -> Self {
        Self::with_state(root, ())
    }
}

impl<State> Router<State>
where
    State: Send + Sync + 'static,
{
    pub fn with_state(root: impl Into<Route<State>>, state: State) -> Self {
        Self {
            root: root.into(),
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> &Arc<State> {
        &self.state
    }

    /// Descends the route tree for the provided method and path.
    ///
    /// Returns `None` if a path branch has no matching entry, a method branch
    /// has no entry for `method`, or the subtree selected by an earlier match
    /// does not resolve. Sibling entries are never revisited once a pattern
    /// has matched.
    ///
    pub fn resolve<'a>(&'a self, method: &Method, path: &str) -> Option<Resolution<'a, State>> {
        let mut routing = Routing::new(path);
        let mut middleware = SmallVec::new();
        let mut node = &self.root;

        loop {
            node = match node {
                Route::Leaf(leaf) => {
                    return Some(Resolution {
                        routing,
                        middleware,
                        leaf,
                    });
                }
                Route::Paths(entries) => {
                    let remainder = routing.remainder();
                    let found = entries.iter().find_map(|(pattern, route)| {
                        Some((pattern, pattern.matches(remainder)?, route))
                    });

                    let Some((pattern, matched, route)) = found else {
                        trace!(remainder, "no pattern matched the remainder");
                        return None;
                    };

                    trace!(pattern = pattern.as_str(), remainder, "matched");
                    routing = routing.descend(&matched);
                    route
                }
                Route::Methods(entries) => {
                    let Some(route) = entries.get(method) else {
                        trace!(%method, "method branch has no entry");
                        return None;
                    };

                    route
                }
                Route::Stack(list, inner) => {
                    middleware.extend(list.iter());
                    &**inner
                }
            };
        }
    }

    /// Resolves, invokes, and normalizes the response to `request`.
    ///
    /// A request that does not resolve to a leaf becomes a `404` with an
    /// empty body without running any middleware.
    ///
    /// # Errors
    ///
    /// Faults raised by the handler chain that no middleware intercepted are
    /// returned unchanged, as are contract violations from the normalizer.
    /// Mapping them to a response is up to the transport.
    ///
    pub async fn dispatch(&self, request: Request) -> Result<ResponseSpec> {
        let Some(resolution) = self.resolve(request.method(), request.path()) else {
            debug!(method = %request.method(), path = request.path(), "no route matched");
            return Ok(ResponseSpec::not_found());
        };

        let (routing, next) = resolution.into_parts();
        let cx = Context::new(routing, Arc::clone(&self.state));

        next.call(cx, request).await?.normalize()
    }

    /// Dispatches `request` and writes the outcome to `sink`.
    ///
    /// On success, `sink` receives exactly one status, at most one body
    /// write (empty bodies are not written), and exactly one call to end.
    /// On error, nothing is written and the error is returned so the
    /// transport can decide how to respond.
    ///
    pub async fn respond<S>(&self, request: Request, sink: &mut S) -> Result<()>
    where
        S: Sink + Send,
    {
        let (status, body) = self.dispatch(request).await?.into_parts();

        sink.status(status);

        if !body.is_empty() {
            sink.write(body);
        }

        sink.end();
        Ok(())
    }
}

impl<State> Debug for Router<State> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Router")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<'a, State> Resolution<'a, State> {
    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    /// Returns the number of middleware that will wrap the leaf.
    ///
    pub fn depth(&self) -> usize {
        self.middleware.len()
    }

    /// Composes the gathered middleware around the leaf.
    ///
    pub fn into_parts(self) -> (Routing, Next<State>) {
        let next = compose(self.middleware, self.leaf.clone());
        (self.routing, next)
    }
}
