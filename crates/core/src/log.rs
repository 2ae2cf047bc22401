//! The `LogEntry` shape shared between the Log Streamer (`fleetd-controller`)
//! and the HTTP Facade's log/SSE endpoints.

use serde::{Deserialize, Serialize};

/// Which of the four kinds of line populated a `LogEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryKind {
    /// A line read from the container's stdout stream.
    Stdout,
    /// A line read from the container's stderr stream.
    Stderr,
    /// An operator-issued command, injected by the Lifecycle Controller.
    Command,
    /// The output of an operator-issued command.
    CommandOutput,
}

impl LogEntryKind {
    pub fn is_container_output(&self) -> bool {
        matches!(self, LogEntryKind::Stdout | LogEntryKind::Stderr)
    }
}

/// A single timestamped log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub content: String,
    pub kind: LogEntryKind,
}

impl LogEntry {
    pub fn container(kind: LogEntryKind, content: String, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        debug_assert!(kind.is_container_output());
        Self { timestamp, content, kind }
    }

    /// Formats one entry per `GetFormattedLogs`'s rule: operator-injected
    /// lines get a `[HH:MM:SS]` prefix; container lines are verbatim so any
    /// embedded ANSI coloring survives untouched.
    pub fn format_for_display(&self) -> String {
        match self.kind {
            LogEntryKind::Stdout | LogEntryKind::Stderr => self.content.clone(),
            LogEntryKind::Command | LogEntryKind::CommandOutput => {
                format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.content)
            }
        }
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
