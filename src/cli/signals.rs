//! Interrupt handling
//!
//! Ctrl-C and SIGTERM are only observed at the outermost scope; the
//! interactive loop is raced against [`wait_for_interrupt`] in `main`.

use tokio::signal;
use tracing::{info, warn};

/// Resolve when the process is asked to stop (Ctrl-C or SIGTERM)
///
/// If a handler cannot be installed that signal is simply never reported.
pub async fn wait_for_interrupt() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C signal received"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("SIGTERM signal received");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
