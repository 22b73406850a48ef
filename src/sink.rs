use http::StatusCode;

/// The transport side of [`Router::respond`](crate::Router::respond).
///
/// For each request that completes without a fault, a sink receives exactly
/// one call to `status`, at most one call to `write`, and exactly one call to
/// `end`, in that order.
///
pub trait Sink {
    fn status(&mut self, status: StatusCode);

    fn write(&mut self, body: String);

    fn end(&mut self);
}

impl<T: Sink + ?Sized> Sink for &mut T {
    fn status(&mut self, status: StatusCode) {
        (**self).status(status);
    }

    fn write(&mut self, body: String) {
        (**self).write(body);
    }

    fn end(&mut self) {
        (**self).end();
    }
}
