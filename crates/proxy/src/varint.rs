//! Minecraft protocol VarInt codec: up to 5 bytes, 7 payload bits per byte,
//! continuation bit `0b1000_0000`. Grounded directly on
//! `valence_protocol::VarInt`'s `decode_partial`/`Encode` implementation.

use crate::error::{ProxyError, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

pub const MAX_SIZE: usize = 5;

/// Defensive cap on a declared packet body length: rejects the frame
/// before any allocation sized by the attacker-controlled VarInt.
pub const MAX_PACKET_LENGTH: i32 = 32 * 1024;

/// Reads a VarInt from an async byte source, one byte at a time, so the
/// caller's read buffer is exactly the bytes consumed (needed to replay
/// them to the backend later).
pub async fn read_var_int<R: AsyncRead + Unpin>(r: &mut R, consumed: &mut Vec<u8>) -> Result<i32> {
    let mut val: i32 = 0;
    for i in 0..MAX_SIZE {
        let byte = r.read_u8().await.map_err(|_| ProxyError::VarIntIncomplete)?;
        consumed.push(byte);
        val |= (i32::from(byte) & 0b0111_1111) << (i * 7);
        if byte & 0b1000_0000 == 0 {
            return Ok(val);
        }
    }
    Err(ProxyError::VarIntTooLarge)
}

/// Decodes a VarInt from an already-buffered slice, returning the value
/// and the number of bytes consumed.
pub fn decode_var_int(buf: &[u8]) -> Result<(i32, usize)> {
    let mut val: i32 = 0;
    for (i, &byte) in buf.iter().enumerate().take(MAX_SIZE) {
        val |= (i32::from(byte) & 0b0111_1111) << (i * 7);
        if byte & 0b1000_0000 == 0 {
            return Ok((val, i + 1));
        }
    }
    if buf.len() >= MAX_SIZE {
        Err(ProxyError::VarIntTooLarge)
    } else {
        Err(ProxyError::VarIntIncomplete)
    }
}

/// Encodes `value` as a VarInt, appending to `out`.
pub fn encode_var_int(mut value: i32, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0b0111_1111) as u8;
        value = ((value as u32) >> 7) as i32;
        if value != 0 {
            byte |= 0b1000_0000;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Returns the number of bytes `value` would occupy when VarInt-encoded.
pub fn written_size(value: i32) -> usize {
    match value {
        0 => 1,
        n => (31 - n.leading_zeros() as usize) / 7 + 1,
    }
}

#[cfg(test)]
#[path = "varint_tests.rs"]
mod tests;
