//! Process shutdown signals.

use std::future::Future;

/// Resolves on Ctrl-C or, on unix, SIGTERM (what `docker stop` sends PID 1).
///
/// The SIGTERM handler is installed before this returns, so a signal that
/// arrives before the future is first polled still resolves it.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        let ctrl_c = async {
            // arch-lint: allow(no-error-swallowing) reason="without a Ctrl-C listener only SIGTERM can stop the server"
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            terminate.recv().await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("ctrl-c received"),
            () = terminate => tracing::info!("SIGTERM received"),
        }
    })
}
