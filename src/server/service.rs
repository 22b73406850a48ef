use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::Full;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::error;

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::router::Router;
use crate::sink::Sink;

type HttpResponse = Response<Full<Bytes>>;

/// A hyper service that dispatches each request through a [`Router`].
///
/// Request bodies are not read. Faults that escape the router become a
/// `500 Internal Server Error` with an empty body.
///
pub struct RouterService<State> {
    router: Arc<Router<State>>,
}

/// Collects the calls made by [`Router::respond`] into an HTTP response.
///
struct HttpSink {
    status: StatusCode,
    body: Bytes,
    ended: bool,
}

impl<State> RouterService<State> {
    pub fn new(router: Arc<Router<State>>) -> Self {
        Self { router }
    }
}

impl<State> Clone for RouterService<State> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
        }
    }
}

impl<State, B> hyper::service::Service<http::Request<B>> for RouterService<State>
where
    State: Send + Sync + 'static,
{
    type Error = Infallible;
    type Future = BoxFuture<Result<HttpResponse, Infallible>>;
    type Response = HttpResponse;

    fn call(&self, request: http::Request<B>) -> Self::Future {
        let router = Arc::clone(&self.router);
        let (parts, _) = request.into_parts();
        let request = Request::from(parts);

        Box::pin(async move {
            let mut sink = HttpSink::new();

            if let Err(error) = router.respond(request, &mut sink).await {
                error!(%error, "uncaught fault");
                return Ok(internal_server_error());
            }

            Ok(sink.into_response())
        })
    }
}

impl HttpSink {
    fn new() -> Self {
        Self {
            status: StatusCode::OK,
            body: Bytes::new(),
            ended: false,
        }
    }

    fn into_response(self) -> HttpResponse {
        debug_assert!(
            self.ended,
            "the router returned without ending the response"
        );

        let has_body = !self.body.is_empty();
        let mut response = Response::new(Full::new(self.body));

        *response.status_mut() = self.status;

        if has_body {
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
        }

        response
    }
}

impl Sink for HttpSink {
    fn status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write(&mut self, body: String) {
        self.body = Bytes::from(body);
    }

    fn end(&mut self) {
        self.ended = true;
    }
}

fn internal_server_error() -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));

    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
