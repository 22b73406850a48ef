use std::future;
use tokio::signal;
use tracing::{error, info};

/// Resolves when the process receives a "ctrl-c" signal.
///
/// If the signal handler cannot be registered, the error is logged and the
/// returned future never resolves.
///
pub async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c, shutting down"),
        Err(error) => {
            error!(%error, "unable to register the 'ctrl-c' signal");
            future::pending::<()>().await;
        }
    }
}
