use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::error::Error as StdError;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, watch};
use tokio::task::{JoinError, JoinSet};
use tokio::time;
use tracing::{debug, error, info, warn};

use super::service::RouterService;
use crate::error::Error;
use crate::router::Router;

type TaskResult = Result<(), hyper::Error>;

pub(super) async fn accept<State, F>(
    listener: TcpListener,
    router: Arc<Router<State>>,
    max_connections: usize,
    shutdown_timeout: Duration,
    shutdown: F,
) -> Result<(), Error>
where
    State: Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    // Wait for a permit before accepting a connection once max_connections
    // connections are inflight.
    let semaphore = Arc::new(Semaphore::new(max_connections));

    // Inflight connections. Drained before the server exits.
    let mut connections = JoinSet::new();

    let mut shutdown_rx = {
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            shutdown.await;

            if tx.send(true).is_err() {
                warn!("unable to notify connections to shutdown");
            }
        });

        rx
    };

    let service = RouterService::new(router);

    'accept: loop {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };

        let stream = {
            let mut will_join_next = !connections.is_empty();
            let accepted = loop {
                tokio::select! {
                    biased;

                    Ok(()) = shutdown_rx.changed() => {
                        break 'accept;
                    }

                    joined = connections.join_next(), if will_join_next => {
                        if let Some(result) = joined {
                            handle_joined(result);
                        }

                        will_join_next = false;
                    }

                    result = listener.accept() => {
                        break result;
                    }
                }
            };

            match accepted {
                Ok((stream, address)) => {
                    debug!(%address, "accepted connection");
                    stream
                }
                Err(error) => {
                    drop(permit);
                    warn!(%error, "unable to accept connection");
                    continue;
                }
            }
        };

        connections.spawn({
            let service = service.clone();
            let mut shutdown_rx = shutdown_rx.clone();

            async move {
                let connection = http1::Builder::new()
                    .timer(TokioTimer::new())
                    .serve_connection(TokioIo::new(stream), service);

                tokio::pin!(connection);

                let result = tokio::select! {
                    served = &mut connection => served,
                    _ = shutdown_rx.changed() => {
                        connection.as_mut().graceful_shutdown();
                        connection.await
                    }
                };

                drop(permit);
                result
            }
        });

        if let Some(result) = connections.try_join_next() {
            handle_joined(result);
        }
    }

    info!(inflight = connections.len(), "draining connections");

    if time::timeout(shutdown_timeout, drain(&mut connections))
        .await
        .is_err()
    {
        connections.abort_all();
        return Err(Error::new(format!(
            "inflight connections did not close within {:?}",
            shutdown_timeout
        )));
    }

    Ok(())
}

fn handle_joined(result: Result<TaskResult, JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            if is_disconnect(&error) {
                debug!(%error, "connection closed by peer");
            } else {
                error!(%error, "http error");
            }
        }
        Err(error) if error.is_panic() => error!(%error, "connection task panicked"),
        Err(error) => debug!(%error, "connection task cancelled"),
    }
}

fn is_disconnect(error: &hyper::Error) -> bool {
    error.is_canceled()
        || error.is_incomplete_message()
        || error
            .source()
            .and_then(|source| source.downcast_ref::<io::Error>())
            .is_some_and(|error| error.kind() == io::ErrorKind::NotConnected)
}

async fn drain(connections: &mut JoinSet<TaskResult>) {
    while let Some(result) = connections.join_next().await {
        handle_joined(result);
    }
}
