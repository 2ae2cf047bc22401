//! Proxy-local error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("handshake read timed out")]
    HandshakeTimeout,

    #[error("declared packet length {0} exceeds the 32 KiB guard")]
    PacketTooLarge(i32),

    #[error("incomplete VarInt")]
    VarIntIncomplete,

    #[error("VarInt spans more than 5 bytes")]
    VarIntTooLarge,

    #[error("malformed handshake: {0}")]
    MalformedHandshake(String),

    #[error("listener port {0} is already bound")]
    PortInUse(u16),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
