//! Signal handling and a bounded-drain graceful shutdown for the HTTP
//! facade, matching the teacher's `env::drain_timeout` intent (no literal
//! counterpart in the teacher, since it serves a Unix socket rather than
//! HTTP; this generalizes the same "drain in-flight work, then force
//! exit" shape to `axum::serve`).

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

async fn wait_for_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => warn!(%err, "failed to install SIGTERM handler"),
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Serves `app` on `listener` until a shutdown signal arrives, then drains
/// in-flight requests for up to `drain_timeout` before returning.
pub async fn serve_with_drain(
    listener: TcpListener,
    app: Router,
    drain_timeout: Duration,
) -> std::io::Result<()> {
    let (tx, rx) = watch::channel(false);
    let mut rx_graceful = rx.clone();
    let mut rx_deadline = rx;

    tokio::spawn(async move {
        wait_for_signal().await;
        info!("shutdown signal received, draining");
        let _ = tx.send(true);
    });

    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = rx_graceful.wait_for(|shutting_down| *shutting_down).await;
    });

    tokio::select! {
        result = graceful => result,
        _ = async move {
            let _ = rx_deadline.wait_for(|shutting_down| *shutting_down).await;
            tokio::time::sleep(drain_timeout).await;
        } => {
            warn!(?drain_timeout, "drain timeout elapsed, forcing shutdown");
            Ok(())
        }
    }
}
