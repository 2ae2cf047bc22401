//! The Lifecycle Controller: Create/Start/Stop/Restart/Update/Delete and
//! read-path reconciliation for a managed `Server` (§4.4).

use crate::log_streamer::LogStreamer;
use fleetd_core::{
    Clock, Error, ErrorKind, FieldValue, ProxyListener, ProxyListenerId, Result, Route, Server,
    ServerConfig, ServerId, ServerStatus,
};
use fleetd_driver::{ContainerDriver, ContainerState, CreateSpec};
use fleetd_proxy::RouteTable;
use fleetd_storage::Store;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const CONTAINER_INTERNAL_PORT: u16 = 25565;
const RESTART_SETTLE: Duration = Duration::from_secs(2);

/// `POST /servers` request body (§6.1).
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub name: String,
    pub description: String,
    pub mod_loader: String,
    pub mc_version: String,
    /// Required when not proxied; ignored when `proxy_hostname` is set.
    pub port: Option<u16>,
    pub max_players: u32,
    pub memory_mib: u32,
    pub docker_image: String,
    pub auto_start: bool,
    pub start_immediately: bool,
    pub modpack_id: Option<String>,
    pub proxy_hostname: Option<String>,
    pub proxy_listener_id: Option<ProxyListenerId>,
    /// When set and `proxy_hostname` is empty, derive the hostname from the
    /// sanitized server name and the Proxy Manager's configured base DNS
    /// suffix (`bravo` + `example.com` -> `bravo.example.com`) instead of
    /// requiring the caller to spell it out.
    pub use_base_url: bool,
}

/// `PUT /servers/{id}` request body: Server-level attributes plus a
/// ServerConfig patch, both optional (§4.4.3).
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub mod_loader: Option<String>,
    pub mc_version: Option<String>,
    pub max_players: Option<u32>,
    pub memory_mib: Option<u32>,
    pub docker_image: Option<String>,
    pub auto_start: Option<bool>,
    pub tps_query_command: Option<String>,
    pub config_patch: HashMap<String, Option<FieldValue>>,
}

/// Wires the Persistence Store, Container Driver, Log Streamer, and Proxy
/// route table into the single surface the HTTP Facade calls.
pub struct Controller<D, C> {
    store: Arc<Store<C>>,
    driver: Arc<D>,
    logs: Arc<LogStreamer<D, C>>,
    routes: Arc<RouteTable>,
    clock: C,
    data_root: PathBuf,
}

impl<D, C> Clone for Controller<D, C>
where
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            driver: self.driver.clone(),
            logs: self.logs.clone(),
            routes: self.routes.clone(),
            clock: self.clock.clone(),
            data_root: self.data_root.clone(),
        }
    }
}

impl<D, C> Controller<D, C>
where
    D: ContainerDriver,
    C: Clock,
{
    pub fn new(
        store: Arc<Store<C>>,
        driver: Arc<D>,
        logs: Arc<LogStreamer<D, C>>,
        routes: Arc<RouteTable>,
        clock: C,
        data_root: PathBuf,
    ) -> Self {
        Self { store, driver, logs, routes, clock, data_root }
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    // --- Create (§4.4.1) ---

    pub async fn create(&self, req: CreateRequest) -> Result<Server> {
        if req.name.trim().is_empty() {
            return Err(Error::Invalid("name must not be empty".to_string()));
        }
        if req.mc_version.trim().is_empty() {
            return Err(Error::Invalid("mc_version must not be empty".to_string()));
        }

        let wants_proxy = req.proxy_hostname.as_deref().is_some_and(|h| !h.trim().is_empty()) || req.use_base_url;

        let derived_hostname = if req.proxy_hostname.is_none() && req.use_base_url {
            let suffix = self
                .store
                .get_proxy_config()
                .base_dns_suffix
                .ok_or_else(|| Error::Invalid("use_base_url requires a configured proxy base DNS suffix".to_string()))?;
            Some(format!("{}.{suffix}", Server::sanitize_name(&req.name)))
        } else {
            None
        };

        let (internal_port, external_port, proxy_listener_id) = if wants_proxy {
            let listener = self.resolve_listener(req.proxy_listener_id)?;
            (CONTAINER_INTERNAL_PORT, listener.port, Some(listener.id))
        } else {
            let port = req.port.ok_or_else(|| Error::Invalid("port is required for a non-proxied server".to_string()))?;
            if self.store.get_server_by_port(port).is_some() || self.store.get_proxy_listener_by_port(port).is_some() {
                return Err(Error::Conflict(format!("port {port} already in use")));
            }
            (port, port, None)
        };

        let id = ServerId::new();
        let sanitized = Server::sanitize_name(&req.name);
        let data_dir = self.data_root.join("servers").join(format!("{sanitized}_{id}"));

        let proxy_hostname = req
            .proxy_hostname
            .filter(|h| !h.trim().is_empty())
            .map(|h| h.trim().to_ascii_lowercase())
            .or(derived_hostname);

        let server = Server {
            id,
            name: req.name,
            description: req.description,
            mc_version: req.mc_version,
            mod_loader: req.mod_loader,
            docker_image: req.docker_image,
            memory_mib: req.memory_mib,
            max_players: req.max_players,
            data_dir: data_dir.to_string_lossy().to_string(),
            status: ServerStatus::Creating,
            container_id: None,
            created_at: self.clock.now_utc(),
            last_started_at: None,
            proxy_hostname,
            proxy_listener_id,
            internal_port,
            external_port,
            auto_start: req.auto_start,
            detached: false,
            tps_query_command: None,
            metrics: Default::default(),
        };

        let server = self.store.create_server(server)?;
        self.store.create_default_server_config(server.id)?;
        self.store.sync_server_config_with_server(server.id)?;

        let modpack_id = req.modpack_id;
        if let Some(modpack_id) = modpack_id {
            let mut config = self.store.get_server_config(server.id)?;
            config.modpack_id = Some(modpack_id);
            self.store.save_server_config(config)?;
        }

        self.spawn_create(server.id, req.start_immediately);

        Ok(server)
    }

    /// Step 6: detached, request-independent. Grounded in the teacher's
    /// "spawn a background task with its own context" note — image pulls
    /// must outlive the HTTP request that triggered them.
    fn spawn_create(&self, id: ServerId, start_immediately: bool) {
        let this = self.clone();
        tokio::spawn(async move {
            let lock = this.store.server_lock(id);
            let _guard = lock.lock().await;

            let mut server = match this.store.get_server(id) {
                Ok(s) => s,
                Err(err) => {
                    warn!(%id, error = %err, "server vanished before async create ran");
                    return;
                }
            };

            if let Err(err) = this.materialize_container(&mut server).await {
                warn!(%id, error = %err, "async create failed");
                server.status = ServerStatus::Error { code: ErrorKind::from(&err), message: err.to_string() };
                server.container_id = None;
                let _ = this.store.update_server(server);
                return;
            }

            server.status = ServerStatus::Stopped;
            if let Err(err) = this.store.update_server(server.clone()) {
                warn!(%id, error = %err, "failed to persist server after create");
                return;
            }

            if start_immediately {
                if let Err(err) = this.start_locked(&mut server).await {
                    warn!(%id, error = %err, "start_immediately failed after create");
                }
            }
            info!(%id, "server created");
        });
    }

    fn resolve_listener(&self, explicit: Option<ProxyListenerId>) -> Result<ProxyListener> {
        let listeners = self.store.get_proxy_listeners();
        if let Some(id) = explicit {
            return listeners
                .into_iter()
                .find(|l| l.id == id && l.enabled)
                .ok_or_else(|| Error::Invalid(format!("proxy listener {id} not found or disabled")));
        }
        listeners
            .iter()
            .find(|l| l.enabled && l.is_default)
            .or_else(|| listeners.iter().find(|l| l.enabled))
            .cloned()
            .ok_or_else(|| Error::Invalid("no enabled proxy listener available".to_string()))
    }

    /// Builds a `CreateSpec` from the Server's current attributes and its
    /// projected config, creates the container, and (for proxied Servers)
    /// resolves the ephemeral host port the proxy will dial.
    async fn materialize_container(&self, server: &mut Server) -> Result<()> {
        let mut config = self.store.get_server_config(server.id)?;
        config.sync_with_server(server);
        let config = self.store.save_server_config(config)?;

        let spec = self.build_create_spec(server, &config);
        let container_id = self.driver.create(&spec).await?;
        server.container_id = Some(container_id);
        Ok(())
    }

    fn build_create_spec(&self, server: &Server, config: &ServerConfig) -> CreateSpec {
        let mut env = config.project();
        env.insert("EULA".to_string(), "true".to_string());
        env.insert("VERSION".to_string(), server.mc_version.clone());
        env.insert("TYPE".to_string(), server.mod_loader.to_ascii_uppercase());
        env.insert("MAX_PLAYERS".to_string(), server.max_players.to_string());

        let port_bindings = if server.is_proxied() {
            vec![(0, CONTAINER_INTERNAL_PORT)]
        } else {
            vec![(server.external_port, CONTAINER_INTERNAL_PORT)]
        };

        let mut labels = HashMap::new();
        labels.insert("fleetd.server_id".to_string(), server.id.to_string());

        CreateSpec { image: server.docker_image.clone(), env, port_bindings, binds: vec![(server.data_dir.clone(), "/data".to_string())], labels }
    }

    // --- Start / Stop / Restart (§4.4.2) ---

    pub async fn start(&self, id: ServerId) -> Result<Server> {
        let lock = self.store.server_lock(id);
        let _guard = lock.lock().await;
        let mut server = self.store.get_server(id)?;
        self.start_locked(&mut server).await?;
        Ok(server)
    }

    async fn start_locked(&self, server: &mut Server) -> Result<()> {
        if server.status.is_running() {
            return Ok(());
        }
        let Some(container_id) = server.container_id.clone() else {
            return Err(Error::Invalid("server has no container to start".to_string()));
        };

        self.driver.start(&container_id).await?;
        self.logs.start_streaming(&container_id).await;
        server.last_started_at = Some(self.clock.now_utc());
        server.status = ServerStatus::Running;

        if server.is_proxied() {
            self.install_route(server, &container_id).await?;
        }

        self.store.clear_ephemeral_config_fields(server.id)?;
        self.store.update_server(server.clone())?;
        Ok(())
    }

    async fn install_route(&self, server: &Server, container_id: &str) -> Result<()> {
        let Some(hostname) = server.proxy_hostname.as_ref() else { return Ok(()) };
        let status = self.driver.inspect(container_id).await?;
        let backend_port = status
            .ports
            .iter()
            .find(|p| p.container_port == CONTAINER_INTERNAL_PORT)
            .map(|p| p.host_port)
            .ok_or_else(|| Error::RuntimeUnavailable("no published port found for proxied server".to_string()))?;
        self.routes.update_server_route(
            hostname,
            Route { server_id: server.id, backend_host: "127.0.0.1".to_string(), backend_port, active: true },
        );
        Ok(())
    }

    pub async fn stop(&self, id: ServerId) -> Result<Server> {
        let lock = self.store.server_lock(id);
        let _guard = lock.lock().await;
        let mut server = self.store.get_server(id)?;
        self.stop_locked(&mut server).await?;
        Ok(server)
    }

    async fn stop_locked(&self, server: &mut Server) -> Result<()> {
        if let Some(container_id) = server.container_id.clone() {
            self.driver.stop(&container_id).await?;
            self.logs.stop_streaming(&container_id).await;
        }
        self.routes.remove_server_route(server.id);
        server.status = ServerStatus::Stopped;
        self.store.update_server(server.clone())?;
        Ok(())
    }

    /// Stop then Start with a short settle delay; Create-then-Start first
    /// if the container doesn't exist yet (§4.4.2, and the REDESIGN FLAG
    /// collapsing Restart into one controller method rather than two
    /// re-entrant HTTP calls).
    pub async fn restart(&self, id: ServerId) -> Result<Server> {
        let lock = self.store.server_lock(id);
        let _guard = lock.lock().await;
        let mut server = self.store.get_server(id)?;
        server.status = ServerStatus::Restarting;
        self.store.update_server(server.clone())?;

        if server.container_id.is_none() {
            self.materialize_container(&mut server).await?;
            self.store.update_server(server.clone())?;
        } else {
            self.stop_locked(&mut server).await?;
            tokio::time::sleep(RESTART_SETTLE).await;
        }

        self.start_locked(&mut server).await?;
        Ok(server)
    }

    // --- Update / recreation (§4.4.3) ---

    pub async fn update(&self, id: ServerId, req: UpdateRequest) -> Result<Server> {
        let lock = self.store.server_lock(id);
        let _guard = lock.lock().await;
        let mut server = self.store.get_server(id)?;
        let mut config = self.store.get_server_config(id)?;

        let old_env = {
            let mut projected = config.clone();
            projected.sync_with_server(&server);
            projected.project()
        };

        if let Some(name) = req.name {
            server.name = name;
        }
        if let Some(desc) = req.description {
            server.description = desc;
        }
        if let Some(cmd) = req.tps_query_command {
            server.tps_query_command = Some(cmd);
        }

        let memory_changed = req.memory_mib.is_some_and(|v| v != server.memory_mib);
        let max_players_changed = req.max_players.is_some_and(|v| v != server.max_players);
        let mod_loader_changed = req.mod_loader.as_ref().is_some_and(|v| *v != server.mod_loader);
        let mc_version_changed = req.mc_version.as_ref().is_some_and(|v| *v != server.mc_version);
        let image_changed = req.docker_image.as_ref().is_some_and(|v| *v != server.docker_image);

        if let Some(v) = req.memory_mib {
            server.memory_mib = v;
        }
        if let Some(v) = req.max_players {
            server.max_players = v;
        }
        if let Some(v) = req.mod_loader {
            server.mod_loader = v;
        }
        if let Some(v) = req.mc_version {
            server.mc_version = v;
        }
        if let Some(v) = req.docker_image {
            server.docker_image = v;
        }
        if let Some(v) = req.auto_start {
            server.auto_start = v;
        }

        config.update(&req.config_patch);
        let mut projected = config.clone();
        projected.sync_with_server(&server);
        let new_env = projected.project();

        let invalidates = memory_changed || max_players_changed || mod_loader_changed || mc_version_changed || image_changed || old_env != new_env;

        self.store.save_server_config(config)?;

        if !invalidates {
            self.store.update_server(server.clone())?;
            return Ok(server);
        }

        let was_running = server.status.is_running();
        let result: Result<()> = async {
            if was_running {
                self.stop_locked(&mut server).await?;
            }
            if let Some(container_id) = server.container_id.take() {
                self.driver.remove(&container_id).await?;
            }
            self.materialize_container(&mut server).await?;
            self.store.update_server(server.clone())?;
            if was_running {
                self.start_locked(&mut server).await?;
            }
            Ok(())
        }
        .await;

        if let Err(err) = result {
            warn!(%id, error = %err, "update recreation failed");
            server.status = ServerStatus::Error { code: ErrorKind::from(&err), message: err.to_string() };
            server.container_id = None;
            self.store.update_server(server.clone())?;
            return Err(err);
        }

        Ok(server)
    }

    // --- Delete (§4.4.4) ---

    pub async fn delete(&self, id: ServerId) -> Result<()> {
        let lock = self.store.server_lock(id);
        let _guard = lock.lock().await;
        let server = self.store.get_server(id)?;

        if let Some(container_id) = &server.container_id {
            if let Err(err) = self.driver.stop(container_id).await {
                warn!(%id, error = %err, "best-effort stop before delete failed");
            }
            self.logs.stop_streaming(container_id).await;
            if let Err(err) = self.driver.remove(container_id).await {
                warn!(%id, error = %err, "best-effort remove before delete failed");
            }
        }
        self.routes.remove_server_route(id);

        self.store.delete_server(id)?;

        if let Err(err) = tokio::fs::remove_dir_all(&server.data_dir).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(%id, error = %err, "failed to remove server data directory");
            }
        }

        Ok(())
    }

    // --- Operator commands ---

    pub async fn run_command(&self, id: ServerId, command: &str) -> Result<String> {
        let server = self.store.get_server(id)?;
        let container_id = server.container_id.clone().ok_or_else(|| Error::Invalid("server has no container".to_string()))?;
        self.logs.add_command_entry(&container_id, command);
        let result = self.driver.exec(&container_id, command, Duration::from_secs(10)).await;
        match result {
            Ok(output) => {
                self.logs.add_command_output(&container_id, &output, true);
                Ok(output)
            }
            Err(err) => {
                let err: Error = err.into();
                self.logs.add_command_output(&container_id, &err.to_string(), false);
                Err(err)
            }
        }
    }

    // --- Logs ---

    pub fn get_logs(&self, id: ServerId, tail: i64) -> Result<Vec<fleetd_core::LogEntry>> {
        let server = self.store.get_server(id)?;
        let Some(container_id) = server.container_id else { return Ok(Vec::new()) };
        Ok(self.logs.get_logs(&container_id, tail))
    }

    pub fn get_formatted_logs(&self, id: ServerId, tail: i64) -> Result<String> {
        let server = self.store.get_server(id)?;
        let Some(container_id) = server.container_id else { return Ok(String::new()) };
        Ok(self.logs.get_formatted_logs(&container_id, tail))
    }

    // --- Reads / reconciliation (§4.4.5) ---

    pub async fn get_server(&self, id: ServerId, full_stats: bool) -> Result<Server> {
        let server = self.store.get_server(id)?;
        Ok(self.reconcile_one(server, full_stats).await)
    }

    pub async fn list_servers(&self, full_stats: bool) -> Vec<Server> {
        let mut out = Vec::new();
        for server in self.store.list_servers() {
            out.push(self.reconcile_one(server, full_stats).await);
        }
        out
    }

    async fn reconcile_one(&self, mut server: Server, full_stats: bool) -> Server {
        if matches!(server.status, ServerStatus::Creating | ServerStatus::Error { .. }) {
            return server;
        }
        let Some(container_id) = server.container_id.clone() else { return server };

        match self.driver.inspect(&container_id).await {
            Ok(status) => {
                server.status = status_from_container_state(status.state);
                if full_stats && status.state.is_running() {
                    self.refresh_stats(&mut server, &container_id).await;
                }
            }
            Err(fleetd_driver::DriverError::NotFound(_)) => {
                // Invariant 1: normalize status, but container_id is only
                // cleared by explicit user action (Delete/Restart).
                server.status = ServerStatus::Stopped;
            }
            Err(err) => {
                warn!(%container_id, error = %err, "inspect failed during reconciliation");
            }
        }

        if let Err(err) = self.store.update_server(server.clone()) {
            warn!(server_id = %server.id, error = %err, "failed to persist reconciled status");
        }
        server
    }

    async fn refresh_stats(&self, server: &mut Server, container_id: &str) {
        if let Ok(stats) = self.driver.stats(container_id).await {
            server.metrics.memory_usage_bytes = stats.memory_usage_bytes;
            server.metrics.cpu_percent = stats.cpu_percent;
        }
        if let Some(cmd) = server.tps_query_command.clone() {
            if let Ok(output) = self.driver.exec(container_id, &cmd, Duration::from_secs(5)).await {
                if let Some(tps) = parse_tps(&output) {
                    server.metrics.tps = Some(tps);
                }
            }
        }
        server.metrics.disk_usage_bytes = dir_size(Path::new(&server.data_dir)).await.unwrap_or(server.metrics.disk_usage_bytes);
    }
}

fn status_from_container_state(state: ContainerState) -> ServerStatus {
    match state {
        ContainerState::Running => ServerStatus::Running,
        ContainerState::Restarting => ServerStatus::Starting,
        ContainerState::Removing => ServerStatus::Stopping,
        ContainerState::Paused | ContainerState::Dead => ServerStatus::Unhealthy,
        ContainerState::Created | ContainerState::Exited => ServerStatus::Stopped,
    }
}

/// Extracts the first floating-point token from a TPS query's output
/// (e.g. `"TPS from last 1m, 5m, 15m: 20.0, 19.9, 19.8"` -> `20.0`).
fn parse_tps(output: &str) -> Option<f64> {
    output.split(|c: char| !c.is_ascii_digit() && c != '.').find_map(|tok| tok.parse::<f64>().ok())
}

async fn dir_size(path: &Path) -> std::io::Result<u64> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || walk_dir_size(&path)).await.unwrap_or(Ok(0))
}

fn walk_dir_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0u64;
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };
    for entry in entries {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            total += walk_dir_size(&entry.path())?;
        } else {
            total += metadata.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
