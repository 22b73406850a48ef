use fernie_router::{Pattern, PatternError};
use http::Method;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::handler::Handler;
use crate::middleware::{Middleware, Next};

/// A node in the declarative route tree.
///
/// The tree is built once at startup and is read-only afterwards. Each node
/// exclusively owns its children.
///
pub enum Route<State = ()> {
    /// A terminal handler.
    Leaf(Next<State>),

    /// Patterns tried in declaration order. The first pattern that matches a
    /// prefix of the remainder is taken, even if the subtree beneath it does
    /// not resolve.
    Paths(Vec<(Pattern, Route<State>)>),

    /// Sub-trees keyed by request method.
    Methods(HashMap<Method, Route<State>>),

    /// Middleware that wrap whatever leaf is resolved beneath `inner`.
    Stack(Vec<Arc<dyn Middleware<State>>>, Box<Route<State>>),
}

/// A builder for [`Route::Paths`]. See [`paths`].
///
pub struct Paths<State = ()> {
    entries: Vec<(Pattern, Route<State>)>,
}

/// A builder for [`Route::Methods`]. See [`methods`].
///
pub struct Methods<State = ()> {
    entries: HashMap<Method, Route<State>>,
}

/// A builder for [`Route::Stack`]. See [`stack`].
///
pub struct Stack<State = ()> {
    middleware: Vec<Arc<dyn Middleware<State>>>,
}

macro_rules! methods_factory {
    ( $( $vis:vis fn $name:ident($method:ident) ),* $(,)? ) => {
        $(
            #[doc = docs_for!($method)]
            $vis fn $name<State, T>(route: T) -> Methods<State>
            where
                T: Into<Route<State>>,
            {
                methods().on(Method::$method, route)
            }
        )*
    };
}

macro_rules! extend_methods {
    ( $( $vis:vis fn $name:ident($method:ident) ),* $(,)? ) => {
        $(
            #[doc = docs_for!($method)]
            $vis fn $name<T>(self, route: T) -> Self
            where
                T: Into<Route<State>>,
            {
                self.on(Method::$method, route)
            }
        )*
    };
}

macro_rules! docs_for {
    ($method:ident) => {
        concat!(
            "Route `",
            stringify!($method),
            "` requests to the provided sub-tree."
        )
    };
}

methods_factory!(
    pub fn delete(DELETE),
    pub fn get(GET),
    pub fn head(HEAD),
    pub fn options(OPTIONS),
    pub fn patch(PATCH),
    pub fn post(POST),
    pub fn put(PUT),
);

/// Returns a leaf node for the provided handler.
///
pub fn leaf<State, H>(handler: H) -> Route<State>
where
    H: Handler<State> + 'static,
{
    Route::Leaf(Next::new(handler))
}

/// Returns an empty path branch.
///
/// ```
/// use fernie::handler::respond;
/// use fernie::{get, leaf, paths};
///
/// let tree = paths()
///     .at("/one", leaf(respond("single")))
///     .at("/two", get(leaf(respond("g"))).post(leaf(respond("p"))));
/// # drop::<fernie::Paths>(tree);
/// ```
///
pub fn paths<State>() -> Paths<State> {
    Paths {
        entries: Vec::new(),
    }
}

/// Returns an empty method branch.
///
pub fn methods<State>() -> Methods<State> {
    Methods {
        entries: HashMap::new(),
    }
}

/// Returns an empty middleware stack.
///
/// ```
/// use fernie::builtin::{inject, rescue};
/// use fernie::handler::respond;
/// use fernie::{Reply, leaf, stack};
///
/// let tree = stack()
///     .with(rescue(|_, _| Ok(Reply::status(404))))
///     .with(inject(|_, _| "test user"))
///     .to(leaf(respond("ok")));
/// # drop::<fernie::Route>(tree);
/// ```
///
pub fn stack<State>() -> Stack<State> {
    Stack {
        middleware: Vec::new(),
    }
}

impl<State> Paths<State> {
    /// Appends an entry to the branch.
    ///
    /// # Panics
    ///
    /// If `pattern` is malformed. Route trees are built at startup, so a bad
    /// pattern is a programming error. Use [`Paths::try_at`] to handle the
    /// error instead.
    ///
    pub fn at<T>(self, pattern: &str, route: T) -> Self
    where
        T: Into<Route<State>>,
    {
        self.try_at(pattern, route)
            .unwrap_or_else(|error| panic!("{}", error))
    }

    /// Appends an entry to the branch or returns an error if `pattern` is
    /// malformed.
    ///
    pub fn try_at<T>(mut self, pattern: &str, route: T) -> Result<Self, PatternError>
    where
        T: Into<Route<State>>,
    {
        self.entries.push((Pattern::parse(pattern)?, route.into()));
        Ok(self)
    }
}

impl<State> Methods<State> {
    extend_methods!(
        pub fn delete(DELETE),
        pub fn get(GET),
        pub fn head(HEAD),
        pub fn options(OPTIONS),
        pub fn patch(PATCH),
        pub fn post(POST),
        pub fn put(PUT),
    );

    /// Routes requests with `method` to the provided sub-tree. A later entry
    /// for the same method replaces an earlier one.
    ///
    pub fn on<T>(mut self, method: Method, route: T) -> Self
    where
        T: Into<Route<State>>,
    {
        self.entries.insert(method, route.into());
        self
    }
}

impl<State> Stack<State> {
    /// Appends a middleware to the stack. Middleware added first wraps the
    /// ones added after it.
    ///
    pub fn with<T>(mut self, middleware: T) -> Self
    where
        T: Middleware<State> + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Finishes the stack by wrapping `route`.
    ///
    pub fn to<T>(self, route: T) -> Route<State>
    where
        T: Into<Route<State>>,
    {
        Route::Stack(self.middleware, Box::new(route.into()))
    }
}

impl<State> From<Paths<State>> for Route<State> {
    fn from(paths: Paths<State>) -> Self {
        Self::Paths(paths.entries)
    }
}

impl<State> From<Methods<State>> for Route<State> {
    fn from(methods: Methods<State>) -> Self {
        Self::Methods(methods.entries)
    }
}

impl<State> Debug for Route<State> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Leaf(_) => f.write_str("Leaf"),
            Self::Paths(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(pattern, route)| (pattern, route)))
                .finish(),
            Self::Methods(entries) => f.debug_map().entries(entries.iter()).finish(),
            Self::Stack(middleware, inner) => f
                .debug_struct("Stack")
                .field("middleware", &middleware.len())
                .field("inner", inner)
                .finish(),
        }
    }
}
