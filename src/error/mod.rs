//! Faults raised while handling a request.
//!
//! A "no match" is not an error. It is represented by
//! [`Reply::NotFound`](crate::Reply::NotFound) and always becomes a `404`
//! response. An [`Error`] is a fault raised by a handler or middleware. It
//! travels outward through the middleware chain until some middleware
//! intercepts it, or it escapes the dispatcher entirely.
//!

mod raise;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};

/// A type alias for `Box<dyn Error + Send + Sync>`.
///
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// A fault raised by a handler, a middleware, or the response normalizer.
///
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug)]
enum ErrorKind {
    Message(String),
    Other(BoxError),
    ContractViolation(String),
}

impl Error {
    /// Returns a new error with the provided message.
    ///
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Message(message.into()),
        }
    }

    /// Returns a new error with the provided source.
    ///
    pub fn from_source(source: BoxError) -> Self {
        Self {
            kind: ErrorKind::Other(source),
        }
    }

    /// Returns `true` if a handler returned a value that could not be
    /// normalized into a response.
    ///
    pub fn is_contract_violation(&self) -> bool {
        matches!(self.kind, ErrorKind::ContractViolation(_))
    }

    /// Returns a reference to the error source, if the error was created from
    /// one.
    ///
    pub fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::Other(source) => Some(&**source),
            ErrorKind::Message(_) | ErrorKind::ContractViolation(_) => None,
        }
    }

    /// Attempts to downcast the error source to a concrete type.
    ///
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.source()?.downcast_ref()
    }
}

impl Error {
    pub(crate) fn contract_violation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ContractViolation(message.into()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.kind {
            ErrorKind::Message(message) => Display::fmt(message, f),
            ErrorKind::Other(source) => Display::fmt(source, f),
            ErrorKind::ContractViolation(message) => {
                write!(f, "contract violation: {}", message)
            }
        }
    }
}

impl<T> From<T> for Error
where
    T: StdError + Send + Sync + 'static,
{
    #[inline]
    fn from(source: T) -> Self {
        Self::from_source(Box::new(source))
    }
}
