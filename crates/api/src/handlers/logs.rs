//! `GET /api/v1/servers/{id}/logs` — a formatted tail by default, or (when
//! the caller sends `Accept: text/event-stream`) a live SSE push of newly
//! appended `LogEntry` records as they land in the ring buffer (§4.7's
//! ambient "live log" extension).

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use fleetd_core::{Clock, LogEntry, ServerId};
use fleetd_driver::ContainerDriver;
use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub tail: i64,
}

pub async fn get_logs<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
    Query(query): Query<LogsQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let id = ServerId::from_string(id);
    if wants_event_stream(&headers) {
        return Ok(logs_sse(state, id, query.tail).await.into_response());
    }
    let body = state.controller.get_formatted_logs(id, query.tail)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}

fn wants_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/event-stream"))
}

/// Opens an SSE stream: first the requested tail as a catch-up batch, then
/// a polling loop that emits only entries appended since the last batch.
/// Polling (rather than a watch channel off `ContainerLogStream`) keeps
/// the Log Streamer's locking discipline (§4.5.6) untouched by the HTTP
/// layer.
async fn logs_sse<D, C>(
    state: AppState<D, C>,
    id: ServerId,
    tail: i64,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    D: ContainerDriver,
    C: Clock,
{
    let initial = state.controller.get_logs(id, tail).unwrap_or_default();
    let last_seen = initial.last().cloned();

    let catch_up = stream::iter(initial.into_iter().map(to_event));
    let live = stream::unfold((state, last_seen), move |(state, last_seen)| async move {
        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            let entries = state.controller.get_logs(id, 0).unwrap_or_default();
            let fresh = new_entries_since(&entries, &last_seen);
            if !fresh.is_empty() {
                let next_last = fresh.last().cloned();
                return Some((fresh, (state, next_last)));
            }
        }
    })
    .flat_map(|batch| stream::iter(batch.into_iter().map(to_event)));

    Sse::new(catch_up.chain(live)).keep_alive(KeepAlive::default())
}

/// Entries are append-only and trimmed only from the head (§4.5.1), so a
/// `last_seen` entry that is still present marks exactly where to resume;
/// one that has aged out of the buffer means every entry now buffered is
/// unseen.
fn new_entries_since(entries: &[LogEntry], last_seen: &Option<LogEntry>) -> Vec<LogEntry> {
    match last_seen {
        Some(last) => match entries.iter().position(|e| e == last) {
            Some(idx) => entries[idx + 1..].to_vec(),
            None => entries.to_vec(),
        },
        None => entries.to_vec(),
    }
}

fn to_event(entry: LogEntry) -> Result<Event, Infallible> {
    Ok(Event::default().event(log_event_name(&entry)).data(serde_json::to_string(&entry).unwrap_or_default()))
}

fn log_event_name(entry: &LogEntry) -> &'static str {
    use fleetd_core::LogEntryKind::*;
    match entry.kind {
        Stdout | Stderr => "log",
        Command => "command",
        CommandOutput => "command_output",
    }
}
