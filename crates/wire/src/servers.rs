use fleetd_core::{ProxyListenerId, Server};
use serde::{Deserialize, Serialize};

/// Body for `POST /api/v1/servers` (spec.md §6.1).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateServerRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mod_loader: String,
    pub mc_version: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub max_players: u32,
    /// Memory budget in MiB; `sync_with_server` derives the JVM heap split
    /// from this value.
    pub memory: u32,
    pub docker_image: String,
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default)]
    pub start_immediately: bool,
    #[serde(default)]
    pub modpack_id: Option<String>,
    #[serde(default)]
    pub proxy_hostname: Option<String>,
    #[serde(default)]
    pub proxy_listener_id: Option<ProxyListenerId>,
    /// Derive `proxy_hostname` from the server name and the Proxy Manager's
    /// base DNS suffix instead of spelling one out.
    #[serde(default)]
    pub use_base_url: bool,
}

/// Body for `PUT /api/v1/servers/{id}`: Server-level attributes only. The
/// ServerConfig patch travels through `ConfigPatchRequest` on the dedicated
/// `/config` endpoint instead, per spec.md §6.1's split between "Partial
/// update" and "Categorized config read/write".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServerRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub mod_loader: Option<String>,
    pub mc_version: Option<String>,
    pub max_players: Option<u32>,
    pub memory: Option<u32>,
    pub docker_image: Option<String>,
    pub auto_start: Option<bool>,
    pub tps_query_command: Option<String>,
}

/// Query string for `GET /api/v1/servers` and `GET /api/v1/servers/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListServersQuery {
    #[serde(default)]
    pub full_stats: bool,
}

/// `GET /api/v1/servers` response envelope. `Server` is already fully
/// `Serialize`/`Deserialize`, so list/detail responses carry it verbatim
/// rather than re-projecting it into a parallel DTO.
#[derive(Debug, Clone, Serialize)]
pub struct ServersResponse {
    pub servers: Vec<Server>,
}

#[cfg(test)]
#[path = "servers_tests.rs"]
mod tests;
