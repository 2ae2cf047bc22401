//! Decodes the container runtime's 8-byte multiplexed stream framing
//! (`[stream_type, 0, 0, 0, len_be32...]`, stream_type 1 = stdout, 2 =
//! stderr) into classified chunks (§4.5.1, §9 "Log demux").

use bytes::{Buf, Bytes, BytesMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Incrementally decodes Docker's multiplexed-frame log stream. Feed raw
/// chunks as they arrive from the driver; drain classified frames with
/// [`Demuxer::next_frame`].
#[derive(Default)]
pub struct Demuxer {
    buf: BytesMut,
}

impl Demuxer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pops one complete `(kind, payload)` frame if the buffer holds an
    /// entire 8-byte header plus its declared-length body; otherwise
    /// returns `None` and leaves the partial frame buffered for the next
    /// `feed`.
    pub fn next_frame(&mut self) -> Option<(StreamKind, Bytes)> {
        if self.buf.len() < 8 {
            return None;
        }
        let stream_type = self.buf[0];
        let len = u32::from_be_bytes([self.buf[4], self.buf[5], self.buf[6], self.buf[7]]) as usize;
        if self.buf.len() < 8 + len {
            return None;
        }
        self.buf.advance(8);
        let payload = self.buf.split_to(len).freeze();
        let kind = match stream_type {
            2 => StreamKind::Stderr,
            _ => StreamKind::Stdout,
        };
        Some((kind, payload))
    }
}

#[cfg(test)]
#[path = "demux_tests.rs"]
mod tests;
