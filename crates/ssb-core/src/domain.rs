use std::{
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;

use crate::{errors::Error, Result};

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

const MAX_SET_NAME_LEN: usize = 64;

fn set_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"))
}

/// Name of a sticker set, checked against an allow-list so it can be used
/// as a single path segment under the storage root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StickerSetName(String);

impl StickerSetName {
    pub fn parse(raw: &str) -> Result<Self> {
        let reject = |reason: &str| Error::InvalidSetName {
            name: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(reject("empty"));
        }
        if raw.len() > MAX_SET_NAME_LEN {
            return Err(reject("longer than 64 characters"));
        }
        if !set_name_re().is_match(raw) {
            return Err(reject(
                "only ASCII letters, digits, '_' and '-' are allowed",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StickerSetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of a sticker set as returned by the sticker service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StickerDescriptor {
    /// Opaque reference used to resolve a download path.
    pub file_id: String,
    /// Zero-based position inside the set.
    pub ordinal: usize,
}

/// Where a single sticker ends up on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTarget {
    pub dir: PathBuf,
    pub file_name: String,
}

impl DownloadTarget {
    /// `<set>_<ordinal>.<ext>`, with `<ext>` taken from the resolved remote
    /// path. A missing or non-alphanumeric extension yields `<set>_<ordinal>`.
    pub fn new(dir: &Path, set: &StickerSetName, ordinal: usize, remote_path: &str) -> Self {
        let ext = Path::new(remote_path)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

        let file_name = match ext {
            Some(ext) => format!("{set}_{ordinal}.{ext}"),
            None => format!("{set}_{ordinal}"),
        };

        Self {
            dir: dir.to_path_buf(),
            file_name,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Positional progress of a running download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressState {
    pub set_name: StickerSetName,
    pub completed: usize,
    pub total: usize,
}

impl ProgressState {
    pub fn status_text(&self) -> String {
        format!(
            "🔄 Downloading \"{}\"...\nDownloaded {}/{} stickers",
            self.set_name, self.completed, self.total
        )
    }
}
