//! Minecraft Handshake packet: outer VarInt length, packet-id `0x00`,
//! protocol version (VarInt), server address (length-prefixed UTF-8),
//! server port (u16 BE), next-state (VarInt: 1 status, 2 login). Struct
//! shape mirrors `valence_protocol::packets::handshake_c2s::HandshakeC2s`.

use crate::error::{ProxyError, Result};
use crate::varint::{self, MAX_PACKET_LENGTH};
use tokio::io::{AsyncRead, AsyncReadExt};

/// FML appends one of these markers to the server address; clients that
/// went through a modded launcher carry it, and the route key must
/// ignore it.
const FML_MARKERS: &[&str] = &["\0FML\0", "\0FML2\0", "\0FML3\0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeIntent {
    Status = 1,
    Login = 2,
}

impl HandshakeIntent {
    fn from_i32(n: i32) -> Option<Self> {
        match n {
            1 => Some(HandshakeIntent::Status),
            2 => Some(HandshakeIntent::Login),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Handshake {
    pub protocol_version: i32,
    /// Lowercased, with any trailing FML marker stripped — the route key.
    pub server_address: String,
    pub server_port: u16,
    pub next_state: HandshakeIntent,
}

/// Strips a trailing FML marker and any stray NUL bytes, then lowercases.
fn normalize_address(raw: &str) -> String {
    let mut addr = raw;
    for marker in FML_MARKERS {
        if let Some(stripped) = addr.strip_suffix(marker) {
            addr = stripped;
            break;
        }
    }
    addr.trim_end_matches('\0').to_ascii_lowercase()
}

/// Reads the Handshake packet from `reader`, accumulating every consumed
/// byte into `peeked` so the caller can replay the exact frame to the
/// backend (spec.md §8 invariant 7: no byte duplicated or dropped).
pub async fn read_handshake<R: AsyncRead + Unpin>(reader: &mut R, peeked: &mut Vec<u8>) -> Result<Handshake> {
    let packet_len = varint::read_var_int(reader, peeked).await?;
    if packet_len < 0 || packet_len > MAX_PACKET_LENGTH {
        return Err(ProxyError::PacketTooLarge(packet_len));
    }

    let mut body = vec![0u8; packet_len as usize];
    reader.read_exact(&mut body).await?;
    peeked.extend_from_slice(&body);

    let mut cursor = 0usize;

    let (packet_id, n) = varint::decode_var_int(&body[cursor..])?;
    cursor += n;
    if packet_id != 0x00 {
        return Err(ProxyError::MalformedHandshake(format!("unexpected packet id {packet_id}")));
    }

    let (protocol_version, n) = varint::decode_var_int(&body[cursor..])?;
    cursor += n;

    let (addr_len, n) = varint::decode_var_int(&body[cursor..])?;
    cursor += n;
    if addr_len < 0 || cursor + addr_len as usize > body.len() {
        return Err(ProxyError::MalformedHandshake("server address length out of bounds".to_string()));
    }
    let raw_address =
        std::str::from_utf8(&body[cursor..cursor + addr_len as usize])
            .map_err(|e| ProxyError::MalformedHandshake(format!("server address is not UTF-8: {e}")))?;
    cursor += addr_len as usize;

    if cursor + 2 > body.len() {
        return Err(ProxyError::MalformedHandshake("missing server port".to_string()));
    }
    let server_port = u16::from_be_bytes([body[cursor], body[cursor + 1]]);
    cursor += 2;

    let (next_state, _) = varint::decode_var_int(&body[cursor..])?;
    let next_state = HandshakeIntent::from_i32(next_state)
        .ok_or_else(|| ProxyError::MalformedHandshake(format!("unknown next_state {next_state}")))?;

    Ok(Handshake {
        protocol_version,
        server_address: normalize_address(raw_address),
        server_port,
        next_state,
    })
}

#[cfg(test)]
#[path = "handshake_tests.rs"]
mod tests;
