//! The Log Streamer: per-container follower tasks, bounded ring buffers,
//! operator command interleaving, and filtered retrieval (§4.5).

use crate::demux::{Demuxer, StreamKind};
use bytes::BytesMut;
use fleetd_core::{Clock, LogEntry, LogEntryKind};
use fleetd_driver::{ContainerDriver, LogStreamOptions};
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default ring buffer capacity per container (§4.5, "default >= 10,000
/// entries").
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Line buffer cap before an oversized line is flushed as-is rather than
/// dropped (§4.5.1).
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// RCON-listener churn patterns filtered before append (§4.5.3).
/// Illustrative and extensible.
const BLOCKED_SUBSTRINGS: &[&str] = &[
    "RCON running on",
    "RCON Running on",
    "Thread RCON Listener started",
    "Thread RCON Client",
];

fn is_blocked(line: &str) -> bool {
    BLOCKED_SUBSTRINGS.iter().any(|pat| line.contains(pat))
}

/// Strips a trailing `\r` left by a CRLF line ending.
fn decode_line_plain(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.strip_suffix('\r').unwrap_or(&text).to_string()
}

/// Collapses carriage-return overwrites, keeping only the segment after the
/// last `\r` in the line (terminal progress bars, "Loading... 50%\rLoading
/// 100%").
fn decode_line_tty(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    match text.rfind('\r') {
        Some(idx) => text[idx + 1..].to_string(),
        None => text.to_string(),
    }
}

/// Pulls complete newline-terminated lines out of `buf`; flushes whatever
/// remains once `buf` reaches `MAX_LINE_BYTES` without a newline.
fn extract_lines(buf: &mut BytesMut, decode: fn(&[u8]) -> String) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let raw = buf.split_to(pos);
            // drop the consumed line plus the newline itself
            let _ = buf.split_to(1);
            lines.push(decode(&raw));
        } else if buf.len() >= MAX_LINE_BYTES {
            let raw = buf.split_to(buf.len());
            lines.push(decode(&raw));
        } else {
            break;
        }
    }
    lines
}

/// A per-container ring buffer plus the follower task's cancellation
/// handle. Each stream has its own lock; the registry lock (in
/// [`LogStreamer`]) is only ever held for map lookup/insert.
pub struct ContainerLogStream {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    active: AtomicBool,
    /// Re-minted by every `start_streaming` call (not just the first): a
    /// `CancellationToken` stays cancelled forever once fired, so reusing
    /// the one from a prior run would make the follower see an
    /// already-cancelled token and exit before reading a single frame.
    cancel: Mutex<CancellationToken>,
    follower: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ContainerLogStream {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(256))),
            capacity,
            active: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
            follower: Mutex::new(None),
        }
    }

    fn append(&self, entry: LogEntry) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// `GetLogs(container-id, tail)`: a copied slice of the last `tail`
    /// entries, or all of them when `tail <= 0` or larger than the buffer.
    pub fn tail(&self, tail: i64) -> Vec<LogEntry> {
        let entries = self.entries.lock();
        if tail <= 0 || tail as usize >= entries.len() {
            entries.iter().cloned().collect()
        } else {
            entries.iter().rev().take(tail as usize).rev().cloned().collect()
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Registry of per-container log streams plus the driver used to follow
/// them.
pub struct LogStreamer<D, C> {
    driver: Arc<D>,
    clock: C,
    streams: Mutex<HashMap<String, Arc<ContainerLogStream>>>,
    capacity: usize,
}

impl<D, C> LogStreamer<D, C>
where
    D: ContainerDriver,
    C: Clock,
{
    pub fn new(driver: Arc<D>, clock: C) -> Self {
        Self::with_capacity(driver, clock, DEFAULT_CAPACITY)
    }

    /// Same as [`Self::new`] but with an overridden per-container ring
    /// buffer capacity, for deployments that want to trade memory for a
    /// longer scrollback.
    pub fn with_capacity(driver: Arc<D>, clock: C, capacity: usize) -> Self {
        Self { driver, clock, streams: Mutex::new(HashMap::new()), capacity }
    }

    fn stream_for(&self, container_id: &str) -> Arc<ContainerLogStream> {
        self.streams
            .lock()
            .entry(container_id.to_string())
            .or_insert_with(|| Arc::new(ContainerLogStream::new(self.capacity)))
            .clone()
    }

    /// `StartStreaming`: idempotent. Spawns a follower task that opens
    /// `Driver.StreamLogs` with `follow = true, tail = 100`, demultiplexes
    /// (or collapses CR for TTY containers), filters, and appends.
    pub async fn start_streaming(&self, container_id: &str) {
        let stream = self.stream_for(container_id);
        if stream.is_active() {
            return;
        }
        stream.active.store(true, Ordering::SeqCst);

        let cancel = {
            let mut guard = stream.cancel.lock();
            *guard = CancellationToken::new();
            guard.clone()
        };
        let driver = self.driver.clone();
        let clock = self.clock.clone();
        let container_id = container_id.to_string();
        let stream_for_task = stream.clone();

        let handle = tokio::spawn(async move {
            if let Err(err) = follow(&driver, &clock, &container_id, &stream_for_task, &cancel).await {
                warn!(container_id, error = %err, "log follower exited");
            }
            stream_for_task.active.store(false, Ordering::SeqCst);
        });
        *stream.follower.lock() = Some(handle);
    }

    /// `StopStreaming`: cancels the follower and marks the stream
    /// inactive. Buffered history survives until `ClearLogs` or container
    /// deletion.
    pub async fn stop_streaming(&self, container_id: &str) {
        let Some(stream) = self.streams.lock().get(container_id).cloned() else { return };
        stream.cancel.lock().cancel();
        let handle = stream.follower.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        stream.active.store(false, Ordering::SeqCst);
    }

    /// `AddCommandEntry`: injects an operator command into the stream,
    /// creating a passive (non-following) stream if one doesn't exist yet
    /// so history accumulates for the next session.
    pub fn add_command_entry(&self, container_id: &str, command: &str) {
        let stream = self.stream_for(container_id);
        stream.append(LogEntry { timestamp: self.clock.now_utc(), content: command.to_string(), kind: LogEntryKind::Command });
    }

    /// `AddCommandOutput`: injects the output of an operator command.
    /// `success` is accepted for parity with the operation signature but
    /// does not change how the line is classified (both outcomes render
    /// the same way per §4.5.4).
    pub fn add_command_output(&self, container_id: &str, output: &str, _success: bool) {
        let stream = self.stream_for(container_id);
        stream.append(LogEntry {
            timestamp: self.clock.now_utc(),
            content: output.to_string(),
            kind: LogEntryKind::CommandOutput,
        });
    }

    /// `GetLogs`.
    pub fn get_logs(&self, container_id: &str, tail: i64) -> Vec<LogEntry> {
        match self.streams.lock().get(container_id) {
            Some(stream) => stream.tail(tail),
            None => Vec::new(),
        }
    }

    /// `GetFormattedLogs`: lines joined by `\n`.
    pub fn get_formatted_logs(&self, container_id: &str, tail: i64) -> String {
        self.get_logs(container_id, tail).iter().map(LogEntry::format_for_display).collect::<Vec<_>>().join("\n")
    }

    pub fn clear_logs(&self, container_id: &str) {
        if let Some(stream) = self.streams.lock().get(container_id) {
            stream.clear();
        }
    }

    pub fn is_streaming(&self, container_id: &str) -> bool {
        self.streams.lock().get(container_id).map(|s| s.is_active()).unwrap_or(false)
    }
}

async fn follow<D: ContainerDriver, C: Clock>(
    driver: &D,
    clock: &C,
    container_id: &str,
    stream: &ContainerLogStream,
    cancel: &CancellationToken,
) -> fleetd_driver::Result<()> {
    let status = driver.inspect(container_id).await?;
    let tty = status.tty;

    let opts = LogStreamOptions { follow: true, tail: 100, stdout: true, stderr: true };
    let mut log_stream = driver.stream_logs(container_id, opts).await?;

    let mut stdout_buf = BytesMut::new();
    let mut stderr_buf = BytesMut::new();
    let mut demux = Demuxer::new();

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => break,
            next = log_stream.next() => next,
        };
        let Some(chunk) = chunk else { break };
        let chunk = chunk?;

        if tty {
            stdout_buf.extend_from_slice(&chunk);
            for line in extract_lines(&mut stdout_buf, decode_line_tty) {
                append_filtered(stream, clock, LogEntryKind::Stdout, line);
            }
            continue;
        }

        demux.feed(&chunk);
        while let Some((kind, payload)) = demux.next_frame() {
            let (buf, entry_kind) = match kind {
                StreamKind::Stdout => (&mut stdout_buf, LogEntryKind::Stdout),
                StreamKind::Stderr => (&mut stderr_buf, LogEntryKind::Stderr),
            };
            buf.extend_from_slice(&payload);
            for line in extract_lines(buf, decode_line_plain) {
                append_filtered(stream, clock, entry_kind, line);
            }
        }
    }

    debug!(container_id, "log follower stream ended");
    Ok(())
}

fn append_filtered<C: Clock>(stream: &ContainerLogStream, clock: &C, kind: LogEntryKind, line: String) {
    if line.is_empty() || is_blocked(&line) {
        return;
    }
    stream.append(LogEntry::container(kind, line, clock.now_utc()));
}

#[cfg(test)]
#[path = "log_streamer_tests.rs"]
mod tests;
