//! `BollardDriver`: the `ContainerDriver` implementation over the Docker
//! Engine API, via `bollard`. Grounded directly on the pack's
//! `DockerOrchestrator` (connect/ping, `create_and_start`, `mapped_port`)
//! and the Docker-direct dashboard's `get_container_stats` (CPU-percent
//! derivation from the two stats deltas Docker's API reports).

use crate::driver::{ContainerDriver, LogStream};
use crate::error::{DriverError, Result};
use crate::types::{ContainerState, ContainerStats, ContainerStatus, CreateSpec, LogStreamOptions, PortMapping};
use async_trait::async_trait;
use bollard::container::LogsOptions;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, CreateImageOptionsBuilder, InspectContainerOptions,
    RemoveContainerOptionsBuilder, StartContainerOptionsBuilder, StatsOptionsBuilder, StopContainerOptionsBuilder,
};
use bollard::Docker;
use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::time::Duration;

pub const FLEETD_SERVER_ID_LABEL: &str = "fleetd.server_id";

pub struct BollardDriver {
    client: Docker,
}

impl BollardDriver {
    /// Connects to the Docker daemon, honoring a `DOCKER_HOST` override
    /// the same way the pack's `DockerOrchestrator::connect` does;
    /// defaults to the local Unix socket.
    pub async fn connect() -> Result<Self> {
        let client = match std::env::var("DOCKER_HOST") {
            Ok(host) if host.starts_with("tcp://") => {
                let rest = host.strip_prefix("tcp://").unwrap_or(&host);
                Docker::connect_with_http(rest, 120, bollard::API_DEFAULT_VERSION)
                    .map_err(|e| DriverError::RuntimeUnavailable(e.to_string()))?
            }
            _ => Docker::connect_with_local_defaults()
                .map_err(|e| DriverError::RuntimeUnavailable(e.to_string()))?,
        };

        client.ping().await.map_err(|e| DriverError::RuntimeUnavailable(e.to_string()))?;
        Ok(Self { client })
    }

    fn map_connect_error(err: bollard::errors::Error) -> DriverError {
        let msg = err.to_string();
        if msg.contains("No such container") {
            DriverError::NotFound(msg)
        } else {
            DriverError::RuntimeUnavailable(msg)
        }
    }
}

#[async_trait]
impl ContainerDriver for BollardDriver {
    async fn create(&self, spec: &CreateSpec) -> Result<String> {
        self.client
            .create_image(
                Some(CreateImageOptionsBuilder::new().from_image(spec.image.as_str()).build()),
                None,
                None,
            )
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| DriverError::ImagePullFailed(e.to_string()))?;

        let mut port_bindings = HashMap::new();
        for &(host_port, container_port) in &spec.port_bindings {
            port_bindings.insert(
                format!("{container_port}/tcp"),
                Some(vec![PortBinding { host_ip: None, host_port: Some(host_port.to_string()) }]),
            );
        }

        let binds = spec.binds.iter().map(|(host, container)| format!("{host}:{container}")).collect();

        let mut labels = spec.labels.clone();
        labels.entry(FLEETD_SERVER_ID_LABEL.to_string()).or_default();

        let env: Vec<String> = spec.env.iter().map(|(k, v)| format!("{k}={v}")).collect();

        let body = ContainerCreateBody {
            image: Some(spec.image.clone()),
            env: Some(env),
            labels: Some(labels),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                binds: Some(binds),
                ..Default::default()
            }),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(CreateContainerOptionsBuilder::new().build()), body)
            .await
            .map_err(|e| DriverError::InvalidSpec(e.to_string()))?;

        Ok(response.id)
    }

    async fn start(&self, container_id: &str) -> Result<()> {
        self.client
            .start_container(container_id, Some(StartContainerOptionsBuilder::new().build()))
            .await
            .map_err(Self::map_connect_error)
    }

    async fn stop(&self, container_id: &str) -> Result<()> {
        self.client
            .stop_container(container_id, Some(StopContainerOptionsBuilder::new().t(10).build()))
            .await
            .map_err(Self::map_connect_error)
    }

    async fn remove(&self, container_id: &str) -> Result<()> {
        self.client
            .remove_container(container_id, Some(RemoveContainerOptionsBuilder::new().force(true).build()))
            .await
            .map_err(Self::map_connect_error)
    }

    async fn inspect(&self, container_id: &str) -> Result<ContainerStatus> {
        let info = self
            .client
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
            .map_err(Self::map_connect_error)?;

        let state = info
            .state
            .as_ref()
            .and_then(|s| s.status)
            .map(|s| ContainerState::from_docker_status(&format!("{s:?}").to_lowercase()))
            .unwrap_or(ContainerState::Created);

        let tty = info.config.as_ref().and_then(|c| c.tty).unwrap_or(false);

        let ports = info
            .network_settings
            .as_ref()
            .and_then(|n| n.ports.as_ref())
            .map(|ports| {
                ports
                    .iter()
                    .filter_map(|(container_port, bindings)| {
                        let container_port: u16 = container_port.split('/').next()?.parse().ok()?;
                        let host_port: u16 = bindings.as_ref()?.first()?.host_port.as_deref()?.parse().ok()?;
                        Some(PortMapping { host_port, container_port })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ContainerStatus { state, tty, ports })
    }

    async fn stats(&self, container_id: &str) -> Result<ContainerStats> {
        let status = self.inspect(container_id).await?;
        if !status.state.is_running() {
            return Ok(ContainerStats::default());
        }

        let sample = self
            .client
            .stats(container_id, Some(StatsOptionsBuilder::new().stream(false).one_shot(true).build()))
            .next()
            .await;

        match sample {
            Some(Ok(stats)) => {
                let cpu_delta = stats.cpu_stats.as_ref().and_then(|c| c.cpu_usage.as_ref()).and_then(|u| u.total_usage).unwrap_or(0) as f64
                    - stats.precpu_stats.as_ref().and_then(|c| c.cpu_usage.as_ref()).and_then(|u| u.total_usage).unwrap_or(0) as f64;
                let system_delta = stats.cpu_stats.as_ref().and_then(|c| c.system_cpu_usage).unwrap_or(0) as f64
                    - stats.precpu_stats.as_ref().and_then(|c| c.system_cpu_usage).unwrap_or(0) as f64;
                let num_cpus = stats
                    .cpu_stats
                    .as_ref()
                    .and_then(|c| c.cpu_usage.as_ref())
                    .and_then(|u| u.percpu_usage.as_ref())
                    .map(|v| v.len())
                    .unwrap_or(1) as f64;

                let cpu_percent = if system_delta > 0.0 && cpu_delta > 0.0 {
                    (cpu_delta / system_delta) * num_cpus * 100.0
                } else {
                    0.0
                };

                let memory_usage_bytes = stats.memory_stats.as_ref().and_then(|m| m.usage).unwrap_or(0);

                Ok(ContainerStats { memory_usage_bytes, cpu_percent })
            }
            _ => Ok(ContainerStats::default()),
        }
    }

    async fn exec(&self, container_id: &str, command: &str, timeout: Duration) -> Result<String> {
        use bollard::exec::{CreateExecOptions, StartExecResults};

        let exec = self
            .client
            .create_exec(
                container_id,
                CreateExecOptions {
                    cmd: Some(vec!["sh".to_string(), "-c".to_string(), command.to_string()]),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await
            .map_err(Self::map_connect_error)?;

        let run = async {
            let mut output = String::new();
            if let StartExecResults::Attached { mut output: stream, .. } =
                self.client.start_exec(&exec.id, None).await.map_err(Self::map_connect_error)?
            {
                while let Some(Ok(chunk)) = stream.next().await {
                    output.push_str(&chunk.to_string());
                }
            }
            Ok::<String, DriverError>(output)
        };

        tokio::time::timeout(timeout, run).await.map_err(|_| DriverError::ExecTimeout(timeout))?
    }

    async fn stream_logs(&self, container_id: &str, opts: LogStreamOptions) -> Result<LogStream> {
        let options = LogsOptions::<String> {
            follow: opts.follow,
            stdout: opts.stdout,
            stderr: opts.stderr,
            tail: opts.tail.to_string(),
            ..Default::default()
        };

        let stream = self.client.logs(container_id, Some(options)).map(|item| {
            item.map(|log_output| Bytes::from(log_output.into_bytes())).map_err(Self::map_connect_error)
        });

        Ok(Box::pin(stream))
    }
}
