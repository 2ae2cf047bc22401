//! Daemon startup: lock acquisition, snapshot load, reconciliation sweep,
//! Proxy Manager bring-up, and HTTP facade bind — in that order, socket
//! bind last (teacher: `lifecycle/startup.rs` step 7 "only after all
//! validation passes").

use std::fs::File;
use std::io::Write as _;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fleetd_controller::{Controller, LogStreamer};
use fleetd_core::{Clock, SystemClock};
use fleetd_driver::{BollardDriver, ContainerDriver};
use fleetd_proxy::{ProxyManager, RouteTable};
use fleetd_storage::Store;
use fs2::FileExt;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::env;

/// Concrete production wiring: real Docker driver, wall-clock time.
pub type ProdController = Controller<BollardDriver, SystemClock>;

#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub lock_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub drain_timeout: Duration,
    pub log_ring_capacity: Option<usize>,
}

impl Config {
    pub fn load() -> Result<Self, StartupError> {
        let state_dir = env::state_dir().map_err(|e| StartupError::NoStateDir(e.to_string()))?;
        Ok(Self {
            lock_path: state_dir.join("fleetd.pid"),
            snapshot_path: state_dir.join("snapshot.json"),
            bind_addr: env::bind_addr(),
            drain_timeout: env::drain_timeout(),
            log_ring_capacity: env::log_ring_capacity(),
            state_dir,
        })
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not determine state directory: {0}")]
    NoStateDir(String),
    #[error("failed to acquire lock: daemon already running? ({0})")]
    LockFailed(std::io::Error),
    #[error("failed to bind HTTP facade on {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] fleetd_storage::StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Holds everything [`startup`] assembled that the caller needs to serve
/// requests and later shut down cleanly. Generic over the container driver
/// so tests can substitute `FakeDriver` for the real `BollardDriver`.
pub struct StartupResult<D: ContainerDriver> {
    pub config: Config,
    pub store: Arc<Store<SystemClock>>,
    pub controller: Controller<D, SystemClock>,
    pub proxy: Arc<ProxyManager>,
    pub listener: TcpListener,
    // Held only to keep the exclusive file lock alive; released on drop.
    #[allow(dead_code)]
    lock_file: File,
}

/// Production entry point: connects to Docker, then runs the shared
/// startup sequence.
pub async fn startup(config: Config) -> Result<StartupResult<BollardDriver>, StartupError> {
    let driver = BollardDriver::connect()
        .await
        .map_err(|e| StartupError::Io(std::io::Error::other(e.to_string())))?;
    startup_with_driver(config, Arc::new(driver)).await
}

/// Runs the daemon's full startup sequence (§2 "Startup/shutdown
/// sequence"): lock, load, reconcile, bring up the proxy, then bind HTTP
/// last. Takes an already-connected driver so tests can inject a fake one.
pub async fn startup_with_driver<D: ContainerDriver>(
    config: Config,
    driver: Arc<D>,
) -> Result<StartupResult<D>, StartupError> {
    match startup_inner(config.clone(), driver).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !matches!(e, StartupError::LockFailed(_)) {
                cleanup_on_failure(&config);
            }
            Err(e)
        }
    }
}

async fn startup_inner<D: ContainerDriver>(
    config: Config,
    driver: Arc<D>,
) -> Result<StartupResult<D>, StartupError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Acquire the lock before touching anything else a second daemon
    // instance could race on.
    let lock_file =
        std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(StartupError::LockFailed)?;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let clock = SystemClock;
    let store = Arc::new(Store::open(config.snapshot_path.clone(), clock.clone())?);
    info!(servers = store.list_servers().len(), "loaded snapshot");

    let logs = match config.log_ring_capacity {
        Some(capacity) => Arc::new(LogStreamer::with_capacity(driver.clone(), clock.clone(), capacity)),
        None => Arc::new(LogStreamer::new(driver.clone(), clock.clone())),
    };
    let routes = Arc::new(RouteTable::new());
    let proxy = Arc::new(ProxyManager::new(routes.clone()));

    let data_root = config.state_dir.join("data");
    let controller = Controller::new(store.clone(), driver, logs, routes, clock, data_root);

    // Reconciliation sweep (§2): normalizes every Server's status against
    // the container runtime's current state before the facade accepts
    // traffic. `list_servers(true)` already performs `Inspect` + persist
    // per Server, the same shape as the teacher's `reconcile_state`.
    let reconciled = controller.list_servers(true).await;
    info!(count = reconciled.len(), "reconciliation sweep complete");

    let enabled_listeners = store.get_proxy_listeners();
    proxy.start(&enabled_listeners).await?;
    info!(listeners = enabled_listeners.iter().filter(|l| l.enabled).count(), "proxy manager started");

    // Bind the HTTP facade last, only once every earlier step has
    // succeeded.
    let listener =
        TcpListener::bind(config.bind_addr).await.map_err(|e| StartupError::BindFailed(config.bind_addr, e))?;
    info!(addr = %config.bind_addr, "http facade bound");

    Ok(StartupResult { config, store, controller, proxy, listener, lock_file })
}

fn cleanup_on_failure(config: &Config) {
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Tears down listeners and releases the lock file. The lock release
/// itself happens implicitly when `StartupResult` (and its `lock_file`)
/// is dropped; this just stops accepting new proxy connections and
/// removes the PID file so a later daemon doesn't find a stale one.
pub struct ShutdownHandle {
    pub proxy: Arc<ProxyManager>,
    pub lock_path: PathBuf,
}

impl ShutdownHandle {
    pub async fn shutdown(self) {
        info!("shutting down");
        self.proxy.stop().await;
        if self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
        info!("shutdown complete");
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
