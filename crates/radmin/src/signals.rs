//! Signal handling for graceful host shutdown.
//!
//! Handles SIGINT and SIGTERM on Unix and Ctrl+C on Windows. The received
//! signal is folded into the shared [`ShutdownState`], the same state an
//! admin `shutdown` command eventually initiates.

use admin_gateway::ShutdownState;
use tokio::signal;
use tracing::info;

/// Waits for a termination signal, then initiates `shutdown_state`.
pub async fn setup_signal_handlers(shutdown_state: &ShutdownState) -> Result<(), Box<dyn std::error::Error>> {
    wait_for_signal().await?;
    info!("📡 Received shutdown signal - initiating graceful shutdown");
    shutdown_state.initiate_shutdown();
    Ok(())
}

/// Resolves on the next termination signal without logging.
pub async fn wait_for_signal() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    Ok(())
}
