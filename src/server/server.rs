use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::info;

use super::accept::accept;
use super::shutdown;
use crate::error::Error;
use crate::router::Router;

const DEFAULT_MAX_CONNECTIONS: usize = 256;

const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Serves a [`Router`] over HTTP/1.1.
///
/// # Example
///
/// ```no_run
/// use fernie::handler::respond;
/// use fernie::{Router, Server, leaf, paths};
///
/// #[tokio::main]
/// async fn main() -> Result<(), fernie::Error> {
///     let router = Router::new(paths().at("/one", leaf(respond("single"))));
///
///     Server::new(router)
///         .max_connections(1024)
///         .listen("127.0.0.1:3000")
///         .await
/// }
/// ```
///
pub struct Server<State> {
    router: Arc<Router<State>>,
    max_connections: usize,
    shutdown_timeout: Duration,
}

impl<State> Server<State>
where
    State: Send + Sync + 'static,
{
    pub fn new(router: Router<State>) -> Self {
        Self {
            router: Arc::new(router),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// The maximum number of connections served at once.
    ///
    /// **Default:** `256`
    ///
    pub fn max_connections(mut self, n: usize) -> Self {
        self.max_connections = n;
        self
    }

    /// How long inflight connections have to close after a shutdown signal
    /// is received.
    ///
    /// **Default:** `30s`
    ///
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Binds to `address` and serves connections until the process receives
    /// a "ctrl-c" signal.
    ///
    /// # Errors
    ///
    /// If the listener cannot be bound or inflight connections do not close
    /// within the shutdown timeout.
    ///
    pub async fn listen<A>(self, address: A) -> Result<(), Error>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(address).await?;

        if let Ok(address) = listener.local_addr() {
            info!(%address, "listening");
        }

        self.serve(listener, shutdown::ctrl_c()).await
    }

    /// Serves connections from `listener` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// If inflight connections do not close within the shutdown timeout.
    ///
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        accept(
            listener,
            self.router,
            self.max_connections,
            self.shutdown_timeout,
            shutdown,
        )
        .await
    }
}
