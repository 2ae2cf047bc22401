//! Proxy-side entities: listeners, global proxy config, and the in-memory
//! route table shape. The accept loops and splice logic live in the
//! `fleetd-proxy` crate; this module carries only the persisted/derived
//! data shapes the rest of the workspace shares.

use crate::define_id;
use crate::server::ServerId;
use serde::{Deserialize, Serialize};

define_id! {
    /// Identifies a proxy accept endpoint.
    pub struct ProxyListenerId("lst-");
}

/// An accepting endpoint for the L4 proxy. At most one enabled listener may
/// bind a given port; at most one listener overall may be the default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyListener {
    pub id: ProxyListenerId,
    pub name: String,
    pub port: u16,
    pub enabled: bool,
    pub is_default: bool,
}

/// Global proxy settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub enabled: bool,
    /// Base DNS suffix offered to clients when suggesting a hostname for a
    /// new proxied Server, e.g. `play.example.com`.
    pub base_dns_suffix: Option<String>,
}

/// An in-memory, derived route table entry: hostname -> backend.
///
/// Never persisted; rebuilt from `Server`/`ProxyListener` state and mutated
/// by the Lifecycle Controller as Servers start, stop, or are deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub server_id: ServerId,
    pub backend_host: String,
    pub backend_port: u16,
    pub active: bool,
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
