//! Whole-state snapshot persistence: JSON-serialize the complete
//! `MaterializedState`, write atomically via temp-file-then-rename, and
//! rotate up to [`MAX_BAK_FILES`] backup generations.
//!
//! Grounded in the teacher's `daemon/src/storage/snapshot.rs`
//! (`rotate_bak_path`) and `engine/src/breadcrumb.rs` (temp-path-then-
//! rename write pattern); simplified from the teacher's WAL-sequenced
//! snapshot (no `seq`/migration fields) because this domain has no WAL to
//! checkpoint against.

use crate::error::Result;
use crate::state::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;
const MAX_BAK_FILES: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

/// Pick the next `.bak`/`.bak.N` path, rotating older backups out. Keeps
/// up to [`MAX_BAK_FILES`] generations; the oldest is dropped at capacity.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

/// Writes `state` to `path` atomically: serialize to a sibling `.tmp` file,
/// back up the previous snapshot (if any), then rename the temp file into
/// place.
pub fn save(path: &Path, state: &MaterializedState, now: DateTime<Utc>) -> Result<()> {
    let snapshot = Snapshot { version: CURRENT_SNAPSHOT_VERSION, state: state.clone(), created_at: now };
    let json = serde_json::to_string_pretty(&snapshot)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json.as_bytes())?;

    if path.exists() {
        let bak_path = rotate_bak_path(path);
        fs::copy(path, &bak_path)?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Loads the persisted state from `path`. Returns the default (empty)
/// state when no snapshot file exists yet (first daemon startup).
pub fn load(path: &Path) -> Result<MaterializedState> {
    if !path.exists() {
        return Ok(MaterializedState::default());
    }
    let contents = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&contents)?;
    Ok(snapshot.state)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
