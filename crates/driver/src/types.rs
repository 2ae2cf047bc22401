//! Driver-facing data shapes: the spec a container is created from, the
//! normalized view `Inspect` returns, and the options `StreamLogs` accepts.

use std::collections::HashMap;

/// Everything the Driver needs to materialize a new container. Built by
/// the Lifecycle Controller from a `Server` + its projected `ServerConfig`
/// environment.
#[derive(Debug, Clone)]
pub struct CreateSpec {
    pub image: String,
    pub env: HashMap<String, String>,
    /// Host external port -> container internal port. Empty when proxied
    /// (the proxy dials the container's internal address directly).
    pub port_bindings: Vec<(u16, u16)>,
    /// Host path -> container path (the server's data directory).
    pub binds: Vec<(String, String)>,
    pub labels: HashMap<String, String>,
}

/// The runtime state a container can be in, normalized from the
/// runtime's own vocabulary (`created|running|paused|restarting|removing|
/// exited|dead` for Docker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

impl ContainerState {
    pub fn from_docker_status(status: &str) -> Self {
        match status {
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Created,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running)
    }
}

/// A host-port -> container-port mapping as reported by the runtime.
#[derive(Debug, Clone, Copy)]
pub struct PortMapping {
    pub host_port: u16,
    pub container_port: u16,
}

/// `Inspect`'s normalized result.
#[derive(Debug, Clone)]
pub struct ContainerStatus {
    pub state: ContainerState,
    pub tty: bool,
    pub ports: Vec<PortMapping>,
}

/// `Stats`'s one-shot sample. Zeroed when the container isn't running.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerStats {
    pub memory_usage_bytes: u64,
    pub cpu_percent: f64,
}

/// Options for `StreamLogs`.
#[derive(Debug, Clone, Copy)]
pub struct LogStreamOptions {
    pub follow: bool,
    pub tail: u32,
    pub stdout: bool,
    pub stderr: bool,
}

impl Default for LogStreamOptions {
    fn default() -> Self {
        Self { follow: true, tail: 100, stdout: true, stderr: true }
    }
}
