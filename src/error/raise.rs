/// Return early with a fault.
///
/// # Examples
///
/// ```
/// use fernie::{Context, Request, raise};
///
/// async fn delete(_: Context, _: Request) -> fernie::Result {
///     raise!(message = "Sample error");
/// }
/// ```
///
/// Error sources are boxed implicitly. If the source is already boxed,
/// specify so to avoid allocating twice.
///
/// ```
/// use std::io;
/// use fernie::raise;
///
/// fn read() -> fernie::Result<()> {
///     let error = io::Error::from(io::ErrorKind::NotFound);
///     raise!(error);
/// }
///
/// fn read_boxed() -> fernie::Result<()> {
///     let error = io::Error::from(io::ErrorKind::NotFound);
///     raise!(boxed = Box::new(error));
/// }
/// ```
///
#[macro_export]
macro_rules! raise {
    (message = $message:expr $(,)?) => {
        return Err($crate::Error::new($message))
    };
    (boxed = $source:expr $(,)?) => {
        return Err($crate::Error::from_source($source))
    };
    ($source:expr $(,)?) => {
        return Err($crate::Error::from_source(Box::new($source)))
    };
}
