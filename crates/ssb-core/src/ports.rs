use async_trait::async_trait;

use crate::{
    domain::{StickerDescriptor, StickerSetName},
    Result,
};

/// Port for the sticker service the bot downloads from.
///
/// Each method is one remote call; callers get no batching and no retries.
#[async_trait]
pub trait StickerSource: Send + Sync {
    /// Ordered stickers of a set.
    async fn fetch_set(&self, name: &StickerSetName) -> Result<Vec<StickerDescriptor>>;

    /// Resolve a file reference to a downloadable remote path.
    ///
    /// `Ok(None)` means the service knows the file but has no path for it.
    async fn resolve_file(&self, file_id: &str) -> Result<Option<String>>;

    /// Raw bytes behind a resolved remote path.
    async fn fetch_bytes(&self, remote_path: &str) -> Result<Vec<u8>>;
}
