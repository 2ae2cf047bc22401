//! Per-Server serialization registry (§4.4.3 "Concurrency discipline").
//!
//! The registry lock guards map insertion only, mirroring the Log
//! Streamer's "registry lock for lookup only" discipline (§4.5.6) so that
//! holding one Server's lock never blocks lookups for another.

use fleetd_core::ServerId;
use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

#[derive(Default)]
pub struct ServerLocks {
    locks: SyncMutex<HashMap<ServerId, Arc<AsyncMutex<()>>>>,
}

impl ServerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the per-Server async mutex, creating it on first use.
    pub fn get(&self, id: ServerId) -> Arc<AsyncMutex<()>> {
        self.locks.lock().entry(id).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
