use bytes::Bytes;
use fernie::builtin::rescue;
use fernie::handler::respond;
use fernie::{Context, Error, Reply, Request, Route, Router, Server, get, leaf, paths, stack};
use http::Method;
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn sample_error(_: Context, _: Request) -> fernie::Result {
    Err(Error::new("Sample error"))
}

async fn uncaught(_: Context, _: Request) -> fernie::Result {
    Err(Error::new("uncaught"))
}

fn routes() -> Route {
    let two = get(leaf(respond("GET /two")))
        .put(leaf(respond("PUT /two")))
        .post(leaf(respond("POST /two")))
        .patch(leaf(respond("PATCH /two")))
        .delete(leaf(respond("DELETE /two")));

    let test = get(leaf(respond("test")))
        .patch(leaf(respond("sick")))
        .delete(leaf(sample_error));

    let nested = paths()
        .at("/test", leaf(respond("wew")))
        .at("/second", paths().at("/test", leaf(respond("wow"))));

    paths()
        .at("/one", leaf(respond("single")))
        .at("/two", two)
        .at(
            "/test",
            stack()
                .with(rescue(|_, _| Ok(Reply::status(404))))
                .with(rescue(|_, _| Ok(Reply::status(404))))
                .to(test),
        )
        .at("/nested", nested)
        .at("/fault", leaf(uncaught))
        .into()
}

async fn fetch(address: SocketAddr, method: &Method, path: &str) -> (u16, String) {
    let stream = TcpStream::connect(address).await.unwrap();
    let (mut sender, connection) = http1::handshake(TokioIo::new(stream)).await.unwrap();
    let connection = tokio::spawn(connection);

    let request = http::Request::builder()
        .method(method.clone())
        .uri(path)
        .header(http::header::HOST, "localhost")
        .body(Empty::<Bytes>::new())
        .unwrap();

    let response = sender.send_request(request).await.unwrap();
    let status = response.status().as_u16();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    drop(sender);
    connection.await.unwrap().unwrap();

    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_crud_over_http() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let shutdown = async move {
        let _ = shutdown_rx.await;
    };

    let server = Server::new(Router::new(routes()));
    let server = tokio::spawn(server.serve(listener, shutdown));

    let cases = [
        (Method::GET, "/one", 200, "single"),
        (Method::GET, "/test", 200, "test"),
        (Method::PATCH, "/test", 200, "sick"),
        (Method::DELETE, "/test", 404, ""),
        (Method::GET, "/nested/test", 200, "wew"),
        (Method::GET, "/nested/second/test", 200, "wow"),
        (Method::GET, "/two", 200, "GET /two"),
        (Method::POST, "/two", 200, "POST /two"),
        (Method::PUT, "/two", 200, "PUT /two"),
        (Method::PATCH, "/two", 200, "PATCH /two"),
        (Method::DELETE, "/two", 200, "DELETE /two"),
        (Method::OPTIONS, "/two", 404, ""),
        (Method::GET, "/no-bind", 404, ""),
        (Method::GET, "/fault", 500, ""),
    ];

    for (method, path, status, body) in cases {
        let response = fetch(address, &method, path).await;

        assert_eq!(response, (status, body.to_owned()), "{} {}", method, path);
    }

    shutdown_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
