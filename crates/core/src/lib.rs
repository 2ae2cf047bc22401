//! Domain entities, ID types, the `Clock` abstraction, and the shared error
//! taxonomy for the fleetd workspace. Every other crate depends on this one
//! and nothing in here depends on tokio, bollard, or axum.

pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod log;
pub mod proxy;
pub mod server;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigField, FieldKind, FieldValue, ServerConfig};
pub use error::{Error, Result};
pub use log::{LogEntry, LogEntryKind};
pub use proxy::{ProxyConfig, ProxyListener, ProxyListenerId, Route};
pub use server::{ErrorKind, Server, ServerId, ServerMetrics, ServerStatus};
