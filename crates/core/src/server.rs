//! The `Server` entity and its lifecycle state machine.

use crate::{define_id, Error};
use serde::{Deserialize, Serialize};

define_id! {
    /// Identifies a managed game-server container.
    pub struct ServerId("srv-");
}

/// Recoverable failure kinds persisted alongside a Server in `Error` state.
///
/// Mirrors the Container Driver / Lifecycle Controller failure table:
/// each kind names *why* the Server is stuck, so the Facade can explain it
/// and a retry (user-initiated update or restart) knows what it is retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ImagePullFailed,
    PortConflict,
    RuntimeUnavailable,
    InvalidSpec,
    ExecTimeout,
    StoreError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ImagePullFailed => "image_pull_failed",
            ErrorKind::PortConflict => "port_conflict",
            ErrorKind::RuntimeUnavailable => "runtime_unavailable",
            ErrorKind::InvalidSpec => "invalid_spec",
            ErrorKind::ExecTimeout => "exec_timeout",
            ErrorKind::StoreError => "store_error",
        }
    }
}

impl From<&Error> for ErrorKind {
    fn from(err: &Error) -> Self {
        match err {
            Error::ImagePull(_) => ErrorKind::ImagePullFailed,
            Error::Conflict(_) => ErrorKind::PortConflict,
            Error::RuntimeUnavailable(_) => ErrorKind::RuntimeUnavailable,
            Error::Invalid(_) => ErrorKind::InvalidSpec,
            Error::Internal(_) => ErrorKind::StoreError,
            _ => ErrorKind::StoreError,
        }
    }
}

/// A Server's lifecycle state.
///
/// `Creating -> Stopped -> Starting -> Running -> {Stopping -> Stopped,
/// Unhealthy -> Stopped, Error}`; `Restarting` is `Running -> Stopping ->
/// Stopped -> Starting -> Running`. `Error` is the only state recoverable
/// only by explicit user action (update or retry), never by the
/// reconciler alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServerStatus {
    Creating,
    Stopped,
    Starting,
    Running,
    Stopping,
    Unhealthy,
    Restarting,
    Error { code: ErrorKind, message: String },
}

impl ServerStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, ServerStatus::Error { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ServerStatus::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServerStatus::Creating => "creating",
            ServerStatus::Stopped => "stopped",
            ServerStatus::Starting => "starting",
            ServerStatus::Running => "running",
            ServerStatus::Stopping => "stopping",
            ServerStatus::Unhealthy => "unhealthy",
            ServerStatus::Restarting => "restarting",
            ServerStatus::Error { .. } => "error",
        }
    }
}

/// Cached live metrics, refreshed opportunistically by the reconciler when
/// `full_stats` is requested (§4.4.5). Zeroed when not running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMetrics {
    pub players_online: u32,
    pub memory_usage_bytes: u64,
    pub cpu_percent: f64,
    pub tps: Option<f64>,
    pub disk_usage_bytes: u64,
}

/// The user-visible managed unit: a durable record mapped to an immutable
/// container identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub description: String,
    pub mc_version: String,
    pub mod_loader: String,
    pub docker_image: String,
    /// Memory budget in MiB; also drives ServerConfig's JVM heap sync.
    pub memory_mib: u32,
    pub max_players: u32,
    pub data_dir: String,
    pub status: ServerStatus,
    /// Absent until `Driver.Create` completes; reset on every recreate.
    pub container_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub proxy_hostname: Option<String>,
    pub proxy_listener_id: Option<crate::proxy::ProxyListenerId>,
    /// 25565 when proxied, otherwise the bound container-internal port.
    pub internal_port: u16,
    /// 0 when proxied.
    pub external_port: u16,
    pub auto_start: bool,
    pub detached: bool,
    pub tps_query_command: Option<String>,
    pub metrics: ServerMetrics,
}

impl Server {
    pub fn is_proxied(&self) -> bool {
        self.proxy_hostname.is_some() && self.proxy_listener_id.is_some()
    }

    /// Sanitizes `name` into a filesystem-safe fragment used when composing
    /// the server's data-directory path (`<root>/servers/<sanitized>_<id>`).
    pub fn sanitize_name(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Server {
    /// Minimal builder for tests; fills every required field with an inert
    /// default so call sites only override what the test cares about.
    pub fn test_fixture(id: ServerId) -> Self {
        Server {
            id,
            name: "test-server".to_string(),
            description: String::new(),
            mc_version: "1.20.4".to_string(),
            mod_loader: "vanilla".to_string(),
            docker_image: "itzg/minecraft-server:latest".to_string(),
            memory_mib: 2048,
            max_players: 20,
            data_dir: "/var/lib/fleetd/servers/test-server_0000".to_string(),
            status: ServerStatus::Creating,
            container_id: None,
            created_at: chrono::Utc::now(),
            last_started_at: None,
            proxy_hostname: None,
            proxy_listener_id: None,
            internal_port: 25565,
            external_port: 25565,
            auto_start: false,
            detached: false,
            tps_query_command: None,
            metrics: ServerMetrics::default(),
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
