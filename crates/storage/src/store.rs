//! The Persistence Store: typed CRUD over the entities in
//! `fleetd_core`, backed by an in-process `MaterializedState` guarded by a
//! single `parking_lot::Mutex`, durable via whole-state snapshotting
//! (`snapshot::save`) on every mutating call.

use crate::error::{Result, StoreError};
use crate::lock::ServerLocks;
use crate::snapshot;
use crate::state::MaterializedState;
use fleetd_core::{Clock, ProxyConfig, ProxyListener, ProxyListenerId, Server, ServerConfig, ServerId};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

pub struct Store<C: Clock> {
    state: Mutex<MaterializedState>,
    path: PathBuf,
    clock: C,
    pub server_locks: ServerLocks,
}

impl<C: Clock> Store<C> {
    /// Loads the store from `path` if a snapshot exists, otherwise starts
    /// from an empty state. Does not write anything until the first
    /// mutating call.
    pub fn open(path: PathBuf, clock: C) -> Result<Self> {
        let state = snapshot::load(&path)?;
        Ok(Self { state: Mutex::new(state), path, clock, server_locks: ServerLocks::new() })
    }

    fn persist(&self, state: &MaterializedState) -> Result<()> {
        snapshot::save(&self.path, state, self.clock.now_utc())
    }

    // --- Server ---

    pub fn get_server(&self, id: ServerId) -> Result<Server> {
        self.state
            .lock()
            .servers
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("server {id} not found")))
    }

    pub fn list_servers(&self) -> Vec<Server> {
        self.state.lock().servers.values().cloned().collect()
    }

    pub fn create_server(&self, server: Server) -> Result<Server> {
        let mut state = self.state.lock();
        state.servers.insert(server.id, server.clone());
        self.persist(&state)?;
        Ok(server)
    }

    pub fn update_server(&self, server: Server) -> Result<Server> {
        let mut state = self.state.lock();
        if !state.servers.contains_key(&server.id) {
            return Err(StoreError::NotFound(format!("server {} not found", server.id)));
        }
        state.servers.insert(server.id, server.clone());
        self.persist(&state)?;
        Ok(server)
    }

    pub fn delete_server(&self, id: ServerId) -> Result<()> {
        let mut state = self.state.lock();
        if state.servers.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("server {id} not found")));
        }
        state.server_configs.remove(&id);
        self.persist(&state)?;
        Ok(())
    }

    /// Linear scan: the single-host fleet size this system targets never
    /// justifies an index.
    pub fn get_server_by_port(&self, port: u16) -> Option<Server> {
        self.state
            .lock()
            .servers
            .values()
            .find(|s| !s.is_proxied() && s.external_port == port)
            .cloned()
    }

    // --- ServerConfig ---

    pub fn get_server_config(&self, server_id: ServerId) -> Result<ServerConfig> {
        self.state
            .lock()
            .server_configs
            .get(&server_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("config for server {server_id} not found")))
    }

    pub fn save_server_config(&self, config: ServerConfig) -> Result<ServerConfig> {
        let mut state = self.state.lock();
        state.server_configs.insert(ServerId::from_string(&config.server_id), config.clone());
        self.persist(&state)?;
        Ok(config)
    }

    pub fn create_default_server_config(&self, server_id: ServerId) -> Result<ServerConfig> {
        let config = ServerConfig::with_defaults(server_id.to_string());
        self.save_server_config(config)
    }

    pub fn sync_server_config_with_server(&self, server_id: ServerId) -> Result<ServerConfig> {
        let mut state = self.state.lock();
        let server = state
            .servers
            .get(&server_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("server {server_id} not found")))?;
        let config = state
            .server_configs
            .get_mut(&server_id)
            .ok_or_else(|| StoreError::NotFound(format!("config for server {server_id} not found")))?;
        config.sync_with_server(&server);
        let result = config.clone();
        self.persist(&state)?;
        Ok(result)
    }

    pub fn clear_ephemeral_config_fields(&self, server_id: ServerId) -> Result<()> {
        let mut state = self.state.lock();
        let config = state
            .server_configs
            .get_mut(&server_id)
            .ok_or_else(|| StoreError::NotFound(format!("config for server {server_id} not found")))?;
        config.clear_ephemeral();
        self.persist(&state)?;
        Ok(())
    }

    // --- ProxyListener ---

    pub fn get_proxy_listener(&self, id: ProxyListenerId) -> Result<ProxyListener> {
        self.state
            .lock()
            .proxy_listeners
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("proxy listener {id} not found")))
    }

    pub fn get_proxy_listeners(&self) -> Vec<ProxyListener> {
        self.state.lock().proxy_listeners.values().cloned().collect()
    }

    pub fn get_proxy_listener_by_port(&self, port: u16) -> Option<ProxyListener> {
        self.state.lock().proxy_listeners.values().find(|l| l.port == port).cloned()
    }

    pub fn create_proxy_listener(&self, listener: ProxyListener) -> Result<ProxyListener> {
        let mut state = self.state.lock();
        state.proxy_listeners.insert(listener.id, listener.clone());
        self.persist(&state)?;
        Ok(listener)
    }

    pub fn update_proxy_listener(&self, listener: ProxyListener) -> Result<ProxyListener> {
        let mut state = self.state.lock();
        if !state.proxy_listeners.contains_key(&listener.id) {
            return Err(StoreError::NotFound(format!("proxy listener {} not found", listener.id)));
        }
        state.proxy_listeners.insert(listener.id, listener.clone());
        self.persist(&state)?;
        Ok(listener)
    }

    /// Rejects deletion while any Server still references the listener.
    pub fn delete_proxy_listener(&self, id: ProxyListenerId) -> Result<()> {
        let mut state = self.state.lock();
        if state.servers.values().any(|s| s.proxy_listener_id == Some(id)) {
            return Err(StoreError::Conflict(format!(
                "proxy listener {id} is still referenced by a server"
            )));
        }
        if state.proxy_listeners.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("proxy listener {id} not found")));
        }
        self.persist(&state)?;
        Ok(())
    }

    // --- ProxyConfig ---

    pub fn get_proxy_config(&self) -> ProxyConfig {
        self.state.lock().proxy_config.clone()
    }

    pub fn save_proxy_config(&self, config: ProxyConfig) -> Result<ProxyConfig> {
        let mut state = self.state.lock();
        state.proxy_config = config.clone();
        self.persist(&state)?;
        Ok(config)
    }

    // --- Locking ---

    pub fn server_lock(&self, id: ServerId) -> Arc<tokio::sync::Mutex<()>> {
        self.server_locks.get(id)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
