//! Local sticker storage: one directory per set under a single root.
//!
//! A set counts as downloaded only once its completion marker exists. The
//! marker is written after every sticker of the set has been written, so a
//! directory left behind by an interrupted run is reported as `Partial`.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    domain::{DownloadTarget, StickerSetName},
    Result,
};

/// File name of the completion marker inside a set directory.
pub const COMPLETION_MARKER: &str = ".complete.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMarker {
    pub set_name: String,
    pub sticker_count: usize,
    pub written: usize,
    /// RFC3339, UTC.
    pub downloaded_at: String,
}

impl CompletionMarker {
    pub fn new(set: &StickerSetName, sticker_count: usize, written: usize) -> Self {
        Self {
            set_name: set.to_string(),
            sticker_count,
            written,
            downloaded_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// What is currently on disk for a set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetStatus {
    /// No directory, or an empty one.
    Missing,
    /// Files present but no (readable) completion marker.
    Partial { entries: usize },
    Complete(CompletionMarker),
}

#[derive(Clone, Debug)]
pub struct StickerStore {
    root: PathBuf,
}

impl StickerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Directory for a set. Pure; the name is already allow-listed.
    pub fn locate(&self, set: &StickerSetName) -> PathBuf {
        self.root.join(set.as_str())
    }
}

pub async fn inspect(dir: &Path) -> Result<SetStatus> {
    let mut rd = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SetStatus::Missing),
        Err(e) => return Err(e.into()),
    };

    let mut entries = 0usize;
    let mut has_marker = false;
    while let Some(ent) = rd.next_entry().await? {
        entries += 1;
        if ent.file_name() == COMPLETION_MARKER {
            has_marker = true;
        }
    }

    if entries == 0 {
        return Ok(SetStatus::Missing);
    }
    if !has_marker {
        return Ok(SetStatus::Partial { entries });
    }

    let raw = tokio::fs::read(dir.join(COMPLETION_MARKER)).await?;
    match serde_json::from_slice::<CompletionMarker>(&raw) {
        Ok(marker) => Ok(SetStatus::Complete(marker)),
        Err(e) => {
            warn!(dir = %dir.display(), "unreadable completion marker, treating set as partial: {e}");
            Ok(SetStatus::Partial { entries })
        }
    }
}

pub async fn is_already_downloaded(dir: &Path) -> Result<bool> {
    Ok(matches!(inspect(dir).await?, SetStatus::Complete(_)))
}

/// Make `dir` an empty-or-fresh target for a download.
///
/// A partial directory is wiped so the set is fetched again from scratch.
pub async fn prepare(dir: &Path, status: &SetStatus) -> Result<()> {
    if let SetStatus::Partial { entries } = status {
        warn!(
            dir = %dir.display(),
            entries,
            "discarding partially downloaded set"
        );
        tokio::fs::remove_dir_all(dir).await?;
    }
    tokio::fs::create_dir_all(dir).await?;
    Ok(())
}

/// Write one sticker, replacing any existing file.
pub async fn write_sticker(target: &DownloadTarget, bytes: &[u8]) -> Result<()> {
    let path = target.path();
    tokio::fs::write(&path, bytes).await?;
    debug!(path = %path.display(), size = bytes.len(), "sticker written");
    Ok(())
}

pub async fn mark_complete(dir: &Path, marker: &CompletionMarker) -> Result<()> {
    let json = serde_json::to_vec_pretty(marker)?;
    let tmp = dir.join(format!("{COMPLETION_MARKER}.tmp"));
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, dir.join(COMPLETION_MARKER)).await?;
    Ok(())
}
