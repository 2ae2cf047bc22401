use super::*;
use chrono::TimeZone;

fn ts() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2026, 1, 1, 13, 5, 9).unwrap()
}

#[test]
fn container_lines_format_verbatim() {
    let entry = LogEntry {
        timestamp: ts(),
        content: "\x1b[32m[Server] Done!\x1b[0m".to_string(),
        kind: LogEntryKind::Stdout,
    };
    assert_eq!(entry.format_for_display(), "\x1b[32m[Server] Done!\x1b[0m");
}

#[test]
fn operator_lines_get_timestamp_prefix() {
    let entry = LogEntry {
        timestamp: ts(),
        content: "say hello".to_string(),
        kind: LogEntryKind::Command,
    };
    assert_eq!(entry.format_for_display(), "[13:05:09] say hello");
}

#[test]
fn is_container_output_distinguishes_kinds() {
    assert!(LogEntryKind::Stdout.is_container_output());
    assert!(LogEntryKind::Stderr.is_container_output());
    assert!(!LogEntryKind::Command.is_container_output());
    assert!(!LogEntryKind::CommandOutput.is_container_output());
}

#[test]
fn container_constructor_sets_fields() {
    let entry = LogEntry::container(LogEntryKind::Stderr, "warn: low memory".to_string(), ts());
    assert_eq!(entry.kind, LogEntryKind::Stderr);
    assert_eq!(entry.content, "warn: low memory");
}
