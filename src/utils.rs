//! Utility functions.

use tracing::{info, warn};

/// Resolves once the process receives Ctrl+C.
///
/// If the signal handler cannot be installed the future never resolves,
/// so the run ends only at end of input.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received cancel signal, exiting gracefully"),
        Err(e) => {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
