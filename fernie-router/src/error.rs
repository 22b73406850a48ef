use thiserror::Error;

/// An error that occurs when a path pattern cannot be compiled.
///
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("dynamic segments must be named. found ':' in \"{0}\"")]
    UnnamedDynamic(String),

    #[error("wildcard segments must be named. found '*' in \"{0}\"")]
    UnnamedWildcard(String),

    #[error("empty segment in \"{0}\"")]
    EmptySegment(String),

    #[error("a wildcard must be the last segment in \"{0}\"")]
    WildcardNotLast(String),
}
