#![forbid(unsafe_code)]

mod error;
mod params;
mod path;

pub use error::PatternError;
pub use params::PathParams;
pub use path::{Match, Pattern, Span};
