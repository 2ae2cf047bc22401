//! `MaterializedState`: the complete in-memory picture of the fleet,
//! persisted whole on every mutation (§4.2 of SPEC_FULL.md — snapshot-on-
//! write, not WAL+replay; see DESIGN.md for the Open Question resolution).

use fleetd_core::{ProxyConfig, ProxyListener, ProxyListenerId, Server, ServerConfig, ServerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    pub servers: HashMap<ServerId, Server>,
    pub server_configs: HashMap<ServerId, ServerConfig>,
    pub proxy_listeners: HashMap<ProxyListenerId, ProxyListener>,
    pub proxy_config: ProxyConfig,
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
