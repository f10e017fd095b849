use std::{path::Path, sync::Arc};

use tracing::{debug, info};

use crate::{
    domain::{DownloadTarget, MessageRef, ProgressState, StickerDescriptor, StickerSetName},
    messaging::port::MessagingPort,
    ports::StickerSource,
    storage, Result,
};

pub const DEFAULT_PROGRESS_EVERY: usize = 5;

/// Edits one status message in place.
#[derive(Clone)]
pub struct ProgressReporter {
    messenger: Arc<dyn MessagingPort>,
    status: MessageRef,
}

impl ProgressReporter {
    pub fn new(messenger: Arc<dyn MessagingPort>, status: MessageRef) -> Self {
        Self { messenger, status }
    }

    pub fn status(&self) -> MessageRef {
        self.status
    }

    pub async fn report(&self, text: &str) -> Result<()> {
        self.messenger.edit_text(self.status, text).await
    }

    pub async fn progress(&self, state: &ProgressState) -> Result<()> {
        self.report(&state.status_text()).await
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
}

impl DownloadReport {
    pub fn is_complete(&self) -> bool {
        self.skipped == 0 && self.written == self.total
    }
}

/// Progress is reported every `every` stickers and always on the last one.
pub fn should_report(ordinal: usize, total: usize, every: usize) -> bool {
    let n = ordinal + 1;
    n == total || (every > 0 && n % every == 0)
}

/// Download every descriptor of a set into `dir`, one at a time.
///
/// `dir` must already exist. The first failing resolve, fetch or write stops
/// the loop; files written before it are left in place.
pub async fn run(
    source: &dyn StickerSource,
    reporter: &ProgressReporter,
    set: &StickerSetName,
    dir: &Path,
    descriptors: &[StickerDescriptor],
    progress_every: usize,
) -> Result<DownloadReport> {
    let total = descriptors.len();
    let mut report = DownloadReport {
        total,
        ..Default::default()
    };

    for desc in descriptors {
        let remote_path = match source.resolve_file(&desc.file_id).await? {
            Some(p) if !p.is_empty() => p,
            _ => {
                debug!(set = %set, ordinal = desc.ordinal, "sticker has no file path, skipping");
                report.skipped += 1;
                continue;
            }
        };

        let bytes = source.fetch_bytes(&remote_path).await?;
        let target = DownloadTarget::new(dir, set, desc.ordinal, &remote_path);
        storage::write_sticker(&target, &bytes).await?;
        report.written += 1;

        if should_report(desc.ordinal, total, progress_every) {
            reporter
                .progress(&ProgressState {
                    set_name: set.clone(),
                    completed: desc.ordinal + 1,
                    total,
                })
                .await?;
        }
    }

    info!(
        set = %set,
        total = report.total,
        written = report.written,
        skipped = report.skipped,
        "sticker set downloaded"
    );
    Ok(report)
}
