use fleetd_core::{ProxyListener, Route};
use serde::{Deserialize, Serialize};

/// Body for `POST /api/v1/proxy/listeners`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProxyListenerRequest {
    pub name: String,
    pub port: u16,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub is_default: bool,
}

/// Body for `PUT /api/v1/proxy/listeners/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProxyListenerRequest {
    pub name: Option<String>,
    pub port: Option<u16>,
    pub enabled: Option<bool>,
    pub is_default: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// `ProxyListener` is already `Serialize`; this wrapper just names the
/// single-item response shape for `POST`/`PUT /proxy/listeners`.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyListenerResponse {
    pub listener: ProxyListener,
}

/// `GET /api/v1/proxy/listeners` response.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyListenersResponse {
    pub listeners: Vec<ProxyListener>,
}

/// One entry of `GET /api/v1/proxy/routes`: the hostname key plus its
/// derived `Route`, flattened into a single JSON object for the wire.
#[derive(Debug, Clone, Serialize)]
pub struct RouteView {
    pub hostname: String,
    #[serde(flatten)]
    pub route: Route,
}

/// `GET /api/v1/proxy/routes` response: the current in-memory route
/// snapshot (never persisted, per §4.6.2).
#[derive(Debug, Clone, Serialize)]
pub struct RoutesResponse {
    pub routes: Vec<RouteView>,
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
