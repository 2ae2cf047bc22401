//! The in-memory route table: lowercase hostname -> backend endpoint.
//!
//! Guarded by a single `RwLock`; mutations take the write lock, the accept
//! path takes the read lock just long enough to copy a route into a local
//! variable before dialing (§4.6.2).

use fleetd_core::{Route, ServerId};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct RouteTable {
    routes: RwLock<HashMap<String, Route>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `UpdateServerRoute`: installs or replaces the active route for
    /// `hostname`, keyed lowercase.
    pub fn update_server_route(&self, hostname: &str, route: Route) {
        self.routes.write().insert(hostname.to_ascii_lowercase(), route);
    }

    /// `RemoveServerRoute`: deletes every entry whose `server_id` matches.
    pub fn remove_server_route(&self, server_id: ServerId) {
        self.routes.write().retain(|_, route| route.server_id != server_id);
    }

    /// Looks up `hostname` (already normalized by the handshake parser)
    /// and returns a cheap clone so the caller never holds the lock across
    /// the dial.
    pub fn lookup(&self, hostname: &str) -> Option<Route> {
        self.routes.read().get(hostname).cloned()
    }

    /// `GetRoutes`: a snapshot copy of the whole table.
    pub fn snapshot(&self) -> Vec<(String, Route)> {
        self.routes.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
