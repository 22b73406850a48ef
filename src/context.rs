use fernie_router::{Match, PathParams};
use http::Extensions;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::error::Error;

/// Routing metadata for a single request: the original path, the portion of
/// it that has not been consumed by a path branch, and the parameters
/// captured so far.
///
/// A `Routing` is never mutated after it is created. Each path branch that
/// matches produces a new value with a shorter remainder and an extended
/// parameter table.
///
#[derive(Clone)]
pub struct Routing {
    path: Arc<str>,
    offset: usize,
    params: PathParams,
}

/// The per-request context passed to handlers and middleware.
///
/// Routing metadata lives in a dedicated member so values injected by
/// middleware can never collide with it.
///
pub struct Context<State = ()> {
    routing: Routing,
    extensions: Extensions,
    state: Arc<State>,
}

/// A named path parameter borrowed from a [`Context`].
///
pub struct Param<'a, 'b> {
    name: &'b str,
    value: Option<&'a str>,
}

impl Routing {
    pub(crate) fn new(path: &str) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            params: PathParams::new(),
        }
    }

    /// The full path of the request.
    ///
    pub fn original_path(&self) -> &str {
        &self.path
    }

    /// The portion of the path that has not been consumed by a path branch.
    ///
    pub fn remainder(&self) -> &str {
        self.path.get(self.offset..).unwrap_or_default()
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Returns the raw value of the parameter with the provided name.
    ///
    pub fn param(&self, name: &str) -> Option<&str> {
        let [start, end] = self.params.get(name)?;
        self.path.get(start..end)
    }

    /// Returns a new `Routing` with `matched` applied to the remainder.
    /// Parameters that share a name with one captured at a shallower level
    /// replace it.
    ///
    pub(crate) fn descend(&self, matched: &Match) -> Self {
        let offset = self.offset;
        let mut params = self.params.clone();

        for (name, [start, end]) in matched.captures() {
            params.insert(Arc::clone(name), [offset + start, offset + end]);
        }

        Self {
            path: Arc::clone(&self.path),
            offset: offset + matched.len(),
            params,
        }
    }
}

impl Debug for Routing {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let params: Vec<_> = self
            .params
            .iter()
            .filter_map(|(name, _)| Some((name, self.param(name)?)))
            .collect();

        f.debug_struct("Routing")
            .field("path", &self.path)
            .field("remainder", &self.remainder())
            .field("params", &params)
            .finish()
    }
}

impl<State> Context<State> {
    pub(crate) fn new(routing: Routing, state: Arc<State>) -> Self {
        Self {
            routing,
            extensions: Extensions::new(),
            state,
        }
    }

    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    /// Returns a [`Param`] for the path parameter with the provided name.
    ///
    /// # Example
    ///
    /// ```
    /// use fernie::{Context, Request};
    ///
    /// async fn show(cx: Context, _: Request) -> fernie::Result {
    ///     let id = cx.param("id").into_result()?;
    ///     Ok(id.into())
    /// }
    /// ```
    ///
    pub fn param<'b>(&self, name: &'b str) -> Param<'_, 'b> {
        Param {
            name,
            value: self.routing.param(name),
        }
    }

    /// Returns a reference to the state shared by every request.
    ///
    pub fn state(&self) -> &Arc<State> {
        &self.state
    }

    /// Returns a reference to a value that was injected by an upstream
    /// middleware.
    ///
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.extensions.get()
    }

    /// Returns a new context with `value` merged over the values of `self`.
    /// The context `with` is called on is left unchanged.
    ///
    pub fn with<T>(&self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut extensions = self.extensions.clone();

        extensions.insert(value);

        Self {
            routing: self.routing.clone(),
            extensions,
            state: Arc::clone(&self.state),
        }
    }
}

impl<State> Clone for Context<State> {
    fn clone(&self) -> Self {
        Self {
            routing: self.routing.clone(),
            extensions: self.extensions.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<State> Debug for Context<State> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("routing", &self.routing)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl<'a> Param<'a, '_> {
    /// Returns the raw, undecoded value of the parameter.
    ///
    pub fn as_str(&self) -> Option<&'a str> {
        self.value
    }

    /// Returns the raw value of the parameter or an error if the parameter
    /// was not captured.
    ///
    pub fn into_result(self) -> Result<&'a str, Error> {
        self.value.ok_or_else(|| {
            let message = format!("missing required parameter: \"{}\"", self.name);
            Error::new(message)
        })
    }

    /// Returns the percent-decoded value of the parameter.
    ///
    /// Invalid UTF-8 byte sequences are replaced with the Unicode
    /// replacement character.
    ///
    pub fn decode(self) -> Result<Cow<'a, str>, Error> {
        let encoded = self.into_result()?;

        let decoded = percent_decode_str(encoded).decode_utf8();

        Ok(decoded.unwrap_or_else(|_| {
            warn!(encoded, "path parameter is not valid utf-8 when decoded");
            percent_decode_str(encoded).decode_utf8_lossy()
        }))
    }

    /// Decodes the parameter and then parses it with [`str::parse`].
    ///
    pub fn parse<T>(self) -> Result<T, Error>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        Ok(self.decode()?.parse()?)
    }
}
