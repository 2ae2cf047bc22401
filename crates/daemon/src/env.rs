//! Centralized environment variable access for the daemon binary.
//!
//! Precedence mirrors the teacher's `daemon/src/env.rs`: an explicit
//! `FLEETD_*` override wins, then an XDG-style default, then a hardcoded
//! fallback.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Resolve the state directory: `FLEETD_STATE_DIR` > `XDG_STATE_HOME/fleetd`
/// > `~/.local/state/fleetd`.
pub fn state_dir() -> Result<PathBuf, NoStateDir> {
    if let Ok(dir) = std::env::var("FLEETD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("fleetd"));
    }
    let home = std::env::var("HOME").map_err(|_| NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/fleetd"))
}

#[derive(Debug, thiserror::Error)]
#[error("could not determine state directory (set FLEETD_STATE_DIR or HOME)")]
pub struct NoStateDir;

/// HTTP facade bind address (default `0.0.0.0:8080`).
pub fn bind_addr() -> SocketAddr {
    std::env::var("FLEETD_BIND_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
}

/// Shutdown drain timeout (default 5s, overridable via
/// `FLEETD_DRAIN_TIMEOUT_MS`).
pub fn drain_timeout() -> Duration {
    std::env::var("FLEETD_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Per-container log ring buffer capacity override (default
/// `fleetd_controller::DEFAULT_CAPACITY`).
pub fn log_ring_capacity() -> Option<usize> {
    std::env::var("FLEETD_LOG_RING_CAPACITY").ok().and_then(|s| s.parse::<usize>().ok())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
