//! The Proxy Manager: hostname-aware L4 reverse proxy. Peeks the Minecraft
//! handshake to pick a backend, then splices the TCP connection through
//! (§4.6 of SPEC_FULL.md).

pub mod error;
pub mod handshake;
pub mod listener;
pub mod route;
pub mod varint;

pub use error::{ProxyError, Result};
pub use handshake::{Handshake, HandshakeIntent};
pub use listener::ProxyManager;
pub use route::RouteTable;
