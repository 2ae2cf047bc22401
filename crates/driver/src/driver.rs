//! The `ContainerDriver` trait: abstracts a container runtime so the
//! Lifecycle Controller and Log Streamer never depend on a concrete
//! runtime client directly (test-double-friendly, per the teacher's
//! interface-abstraction convention for external adapters).

use crate::error::Result;
use crate::types::{ContainerStats, ContainerStatus, CreateSpec, LogStreamOptions};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

/// A byte stream of container output. When the container lacks a TTY this
/// carries the runtime's raw 8-byte multiplexed-frame encoding; when TTY
/// is enabled it carries concatenated raw bytes. Dropping the stream
/// terminates the underlying follow request.
pub type LogStream = BoxStream<'static, Result<Bytes>>;

#[async_trait]
pub trait ContainerDriver: Send + Sync + 'static {
    /// Materializes a new container. Container environment is treated as
    /// immutable once created; any config change that affects projection
    /// must go through a recreate, never a live env update.
    async fn create(&self, spec: &CreateSpec) -> Result<String>;

    /// Idempotent against an already-started container.
    async fn start(&self, container_id: &str) -> Result<()>;

    /// Waits for graceful shutdown (bounded, >= 10s) then force-kills.
    /// Idempotent against an already-stopped/absent container.
    async fn stop(&self, container_id: &str) -> Result<()>;

    /// Idempotent against an absent container.
    async fn remove(&self, container_id: &str) -> Result<()>;

    /// Maps the runtime's state vocabulary onto `ContainerStatus`. A
    /// "no such container" condition maps to `DriverError::NotFound` so
    /// the controller can normalize to `Stopped` without string-matching.
    async fn inspect(&self, container_id: &str) -> Result<ContainerStatus>;

    /// One-shot sample; returns zeros when the container is not running.
    async fn stats(&self, container_id: &str) -> Result<ContainerStats>;

    /// Runs a short command inside the container, returning concatenated
    /// stdout. Bounded by `timeout`.
    async fn exec(&self, container_id: &str, command: &str, timeout: std::time::Duration) -> Result<String>;

    /// Returns a single-consumer byte stream of the container's logs.
    async fn stream_logs(&self, container_id: &str, opts: LogStreamOptions) -> Result<LogStream>;
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
