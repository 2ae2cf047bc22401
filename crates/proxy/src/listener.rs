//! Per-listener TCP accept loops, handshake peek, and connection splice
//! (§4.6.1 Listeners, §4.6.3 Running state).

use crate::error::ProxyError;
use crate::handshake;
use crate::route::RouteTable;
use fleetd_core::ProxyListener;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long the accept path waits for a complete handshake before giving
/// up and closing the connection (§4.6.1 step 1).
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(3);

struct RunningListener {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

/// Owns listener sockets and the shared route table. `start`/`stop` bring
/// every enabled listener up/down together; `is_running` reports whether
/// any listener is currently bound.
pub struct ProxyManager {
    routes: Arc<RouteTable>,
    running: parking_lot::Mutex<HashMap<u16, RunningListener>>,
    handshake_timeout: Duration,
}

impl ProxyManager {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self { routes, running: parking_lot::Mutex::new(HashMap::new()), handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT }
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Binds and starts accepting on every enabled listener not already
    /// running. Idempotent: listeners already bound on a port are left
    /// alone.
    pub async fn start(&self, listeners: &[ProxyListener]) -> std::io::Result<()> {
        for listener in listeners.iter().filter(|l| l.enabled) {
            if self.running.lock().contains_key(&listener.port) {
                continue;
            }
            let tcp = TcpListener::bind(("0.0.0.0", listener.port)).await?;
            let cancel = CancellationToken::new();
            let child_cancel = cancel.clone();
            let routes = self.routes.clone();
            let handshake_timeout = self.handshake_timeout;
            let port = listener.port;
            let handle = tokio::spawn(async move {
                accept_loop(tcp, routes, child_cancel, handshake_timeout, port).await;
            });
            self.running.lock().insert(listener.port, RunningListener { cancel, handle });
            info!(port, "proxy listener started");
        }
        Ok(())
    }

    /// Stops every running listener and waits for their accept loops to
    /// exit.
    pub async fn stop(&self) {
        let handles: Vec<_> = self.running.lock().drain().collect();
        for (port, running) in handles {
            running.cancel.cancel();
            let _ = running.handle.await;
            info!(port, "proxy listener stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.running.lock().is_empty()
    }
}

async fn accept_loop(
    tcp: TcpListener,
    routes: Arc<RouteTable>,
    cancel: CancellationToken,
    handshake_timeout: Duration,
    port: u16,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = tcp.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let routes = routes.clone();
                        tokio::spawn(async move {
                            if let Err(err) = handle_connection(stream, &routes, handshake_timeout).await {
                                debug!(%peer, port, error = %err, "proxy connection closed");
                            }
                        });
                    }
                    Err(err) => {
                        warn!(port, error = %err, "proxy accept failed");
                    }
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    routes: &RouteTable,
    handshake_timeout: Duration,
) -> Result<(), ProxyError> {
    let mut peeked = Vec::new();
    let handshake = tokio::time::timeout(handshake_timeout, handshake::read_handshake(&mut stream, &mut peeked))
        .await
        .map_err(|_| ProxyError::HandshakeTimeout)??;

    let route = routes.lookup(&handshake.server_address);

    let route = match route.filter(|r| r.active) {
        Some(route) => route,
        None => {
            // No matching active route: close deterministically rather than
            // synthesizing a status response (spec.md §4.6.1 step 5;
            // DESIGN.md records the choice).
            let _ = stream.shutdown().await;
            return Ok(());
        }
    };

    debug!(
        hostname = %handshake.server_address,
        backend = %format!("{}:{}", route.backend_host, route.backend_port),
        next_state = ?handshake.next_state,
        "proxy routing connection"
    );

    let mut backend = TcpStream::connect((route.backend_host.as_str(), route.backend_port)).await?;
    // Replay the exact peeked bytes first: the handshake reader consumes
    // nothing beyond the declared packet from the client socket, so no
    // bytes are duplicated or dropped (spec.md §8 invariant 7).
    backend.write_all(&peeked).await?;

    tokio::io::copy_bidirectional(&mut stream, &mut backend).await.ok();
    Ok(())
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
