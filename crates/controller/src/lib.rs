//! The Lifecycle Controller: wires the Persistence Store, Container
//! Driver, Log Streamer, and Proxy route table into Create/Start/Stop/
//! Restart/Update/Delete plus read-path reconciliation (§4.4).

pub mod demux;
pub mod lifecycle;
pub mod log_streamer;

pub use demux::{Demuxer, StreamKind};
pub use lifecycle::{Controller, CreateRequest, UpdateRequest};
pub use log_streamer::{ContainerLogStream, LogStreamer, DEFAULT_CAPACITY};
