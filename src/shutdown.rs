//! Process signal handling for graceful shutdown.
//!
//! Both transports stop on SIGINT (Ctrl+C) or SIGTERM. Tool calls hold no
//! state that needs flushing, so shutdown only stops accepting work and
//! lets in-flight requests finish.

use tracing::{error, info};

/// Resolves once SIGINT or SIGTERM is received.
///
/// A handler that cannot be installed is logged and never fires, so a
/// broken signal setup does not shut the server down on its own.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("received SIGTERM, initiating graceful shutdown");
        },
    }
}
