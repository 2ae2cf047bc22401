//! An in-memory `ContainerDriver` test double, standing in for a real
//! Docker daemon in controller/proxy tests. Mirrors the teacher's
//! feature-gated test adapters (`test-support`).

use crate::driver::{ContainerDriver, LogStream};
use crate::error::{DriverError, Result};
use crate::types::{ContainerState, ContainerStats, ContainerStatus, CreateSpec, LogStreamOptions};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

struct FakeContainer {
    state: ContainerState,
    spec: CreateSpec,
    tty: bool,
}

#[derive(Default)]
pub struct FakeDriver {
    containers: Mutex<HashMap<String, FakeContainer>>,
    next_id: AtomicU64,
    next_create_error: Mutex<Option<DriverError>>,
    log_chunks: Mutex<HashMap<String, Vec<Bytes>>>,
    exec_output: Mutex<HashMap<String, String>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arranges for the next `create` call to fail with `err` instead of
    /// succeeding, then resets to normal behavior.
    pub fn fail_next_create_with(&self, err: DriverError) {
        *self.next_create_error.lock() = Some(err);
    }

    /// Test hook: directly set a container's state, bypassing start/stop,
    /// to simulate out-of-band runtime drift for reconciliation tests.
    pub fn set_state(&self, container_id: &str, state: ContainerState) {
        if let Some(c) = self.containers.lock().get_mut(container_id) {
            c.state = state;
        }
    }

    /// Test hook: marks a container as TTY-enabled so `stream_logs`
    /// returns raw concatenated bytes instead of 8-byte multiplexed
    /// frames.
    pub fn set_tty(&self, container_id: &str, tty: bool) {
        if let Some(c) = self.containers.lock().get_mut(container_id) {
            c.tty = tty;
        }
    }

    /// Test hook: queues the chunks `stream_logs` will yield for
    /// `container_id`, in order, then ends the stream.
    pub fn set_log_chunks(&self, container_id: &str, chunks: Vec<Bytes>) {
        self.log_chunks.lock().insert(container_id.to_string(), chunks);
    }

    /// Test hook: sets the output `exec` returns for `container_id`.
    pub fn set_exec_output(&self, container_id: &str, output: impl Into<String>) {
        self.exec_output.lock().insert(container_id.to_string(), output.into());
    }
}

#[async_trait]
impl ContainerDriver for FakeDriver {
    async fn create(&self, spec: &CreateSpec) -> Result<String> {
        if let Some(err) = self.next_create_error.lock().take() {
            return Err(err);
        }
        let id = format!("fake-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.containers.lock().insert(id.clone(), FakeContainer { state: ContainerState::Created, spec: spec.clone(), tty: false });
        Ok(id)
    }

    async fn start(&self, container_id: &str) -> Result<()> {
        let mut containers = self.containers.lock();
        let container = containers
            .get_mut(container_id)
            .ok_or_else(|| DriverError::NotFound(container_id.to_string()))?;
        container.state = ContainerState::Running;
        Ok(())
    }

    async fn stop(&self, container_id: &str) -> Result<()> {
        let mut containers = self.containers.lock();
        let container = containers
            .get_mut(container_id)
            .ok_or_else(|| DriverError::NotFound(container_id.to_string()))?;
        container.state = ContainerState::Exited;
        Ok(())
    }

    async fn remove(&self, container_id: &str) -> Result<()> {
        self.containers.lock().remove(container_id);
        Ok(())
    }

    async fn inspect(&self, container_id: &str) -> Result<ContainerStatus> {
        let containers = self.containers.lock();
        let container = containers
            .get(container_id)
            .ok_or_else(|| DriverError::NotFound(container_id.to_string()))?;
        Ok(ContainerStatus {
            state: container.state,
            tty: container.tty,
            ports: container.spec.port_bindings.iter().map(|&(host, cont)| crate::types::PortMapping {
                host_port: host,
                container_port: cont,
            }).collect(),
        })
    }

    async fn stats(&self, container_id: &str) -> Result<ContainerStats> {
        let containers = self.containers.lock();
        let container = containers
            .get(container_id)
            .ok_or_else(|| DriverError::NotFound(container_id.to_string()))?;
        if container.state.is_running() {
            Ok(ContainerStats { memory_usage_bytes: 256 * 1024 * 1024, cpu_percent: 1.5 })
        } else {
            Ok(ContainerStats::default())
        }
    }

    async fn exec(&self, container_id: &str, _command: &str, _timeout: std::time::Duration) -> Result<String> {
        let containers = self.containers.lock();
        let container = containers
            .get(container_id)
            .ok_or_else(|| DriverError::NotFound(container_id.to_string()))?;
        if !container.state.is_running() {
            return Err(DriverError::NotRunning(container_id.to_string()));
        }
        Ok(self.exec_output.lock().get(container_id).cloned().unwrap_or_default())
    }

    async fn stream_logs(&self, container_id: &str, _opts: LogStreamOptions) -> Result<LogStream> {
        if !self.containers.lock().contains_key(container_id) {
            return Err(DriverError::NotFound(container_id.to_string()));
        }
        let chunks = self.log_chunks.lock().remove(container_id).unwrap_or_default();
        Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }
}
