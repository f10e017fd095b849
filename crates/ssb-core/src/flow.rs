//! Per-message sticker pack flow.
//!
//! `Idle -> Checking -> (AlreadyDone | Fetching) -> Downloading -> Completed`,
//! with `Failed` reachable from every non-terminal stage. All failures past
//! the set-name checks are caught here once: logged, then answered with a
//! single generic notice.

use std::{collections::HashMap, fmt, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, warn};

use crate::{
    domain::{ChatId, MessageRef, StickerSetName},
    download::{self, DownloadReport, ProgressReporter},
    messaging::port::MessagingPort,
    ports::StickerSource,
    storage::{self, CompletionMarker, SetStatus, StickerStore},
    Result,
};

pub const NOT_IN_SET_TEXT: &str = "Please send a sticker from a sticker set.";
pub const PROCESSING_TEXT: &str = "🔄 Processing your sticker pack...";
pub const FAILURE_TEXT: &str =
    "❌ An error occurred while processing your sticker pack. Please try again later.";

pub fn already_downloaded_text(set: &StickerSetName) -> String {
    format!("ℹ️ Sticker pack \"{set}\" is already downloaded in your local device!")
}

pub fn completed_text(set: &StickerSetName, report: &DownloadReport) -> String {
    let mut text = format!("✅ Sticker pack \"{set}\" has been downloaded to your local device!");
    if report.skipped > 0 {
        text.push_str(&format!(
            "\n⚠️ {} of {} stickers had no downloadable file and were skipped.",
            report.skipped, report.total
        ));
    }
    text
}

pub fn failed_status_text(set: &StickerSetName) -> String {
    format!("❌ Sticker pack \"{set}\" could not be downloaded.")
}

pub fn rejected_text(raw: &str) -> String {
    format!("❌ Sticker pack name \"{raw}\" can't be stored safely, skipping it.")
}

/// Stage a flow was in when it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Checking,
    Fetching,
    Downloading,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Checking => "checking",
            Stage::Fetching => "fetching",
            Stage::Downloading => "downloading",
        };
        f.write_str(s)
    }
}

/// Terminal state of one handled sticker message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The sticker does not belong to a set.
    NotInSet,
    /// The set name failed the path allow-list.
    Rejected,
    AlreadyDone,
    Completed(DownloadReport),
    Failed(Stage),
}

/// One mutex per sticker set name, so two chats asking for the same set
/// never download into the same directory at once.
#[derive(Default)]
pub struct SetLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SetLocks {
    pub async fn lock_set(&self, set: &StickerSetName) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(set.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

struct Attempt {
    stage: Stage,
    status: Option<MessageRef>,
}

pub struct StickerFlow {
    store: StickerStore,
    source: Arc<dyn StickerSource>,
    messenger: Arc<dyn MessagingPort>,
    locks: SetLocks,
    progress_every: usize,
}

impl StickerFlow {
    pub fn new(
        store: StickerStore,
        source: Arc<dyn StickerSource>,
        messenger: Arc<dyn MessagingPort>,
        progress_every: usize,
    ) -> Self {
        Self {
            store,
            source,
            messenger,
            locks: SetLocks::default(),
            progress_every,
        }
    }

    pub fn store(&self) -> &StickerStore {
        &self.store
    }

    /// Handle one inbound sticker.
    ///
    /// Only errors from sending the final user-facing reply escape; those
    /// belong to the messaging platform, not to the flow.
    pub async fn handle(&self, chat_id: ChatId, set_name: Option<&str>) -> Result<FlowOutcome> {
        let Some(raw) = set_name else {
            self.messenger.send_text(chat_id, NOT_IN_SET_TEXT).await?;
            return Ok(FlowOutcome::NotInSet);
        };

        let set = match StickerSetName::parse(raw) {
            Ok(set) => set,
            Err(e) => {
                warn!(chat_id = chat_id.0, "rejecting sticker set: {e}");
                self.messenger.send_text(chat_id, &rejected_text(raw)).await?;
                return Ok(FlowOutcome::Rejected);
            }
        };

        let mut attempt = Attempt {
            stage: Stage::Checking,
            status: None,
        };

        match self.download_set(chat_id, &set, &mut attempt).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(
                    set = %set,
                    chat_id = chat_id.0,
                    stage = %attempt.stage,
                    "error processing sticker pack: {e}"
                );
                if let Some(status) = attempt.status {
                    if let Err(e) = self
                        .messenger
                        .edit_text(status, &failed_status_text(&set))
                        .await
                    {
                        warn!(set = %set, "failed to mark status message as failed: {e}");
                    }
                }
                self.messenger.send_text(chat_id, FAILURE_TEXT).await?;
                Ok(FlowOutcome::Failed(attempt.stage))
            }
        }
    }

    async fn download_set(
        &self,
        chat_id: ChatId,
        set: &StickerSetName,
        attempt: &mut Attempt,
    ) -> Result<FlowOutcome> {
        let status = self.messenger.send_text(chat_id, PROCESSING_TEXT).await?;
        attempt.status = Some(status);
        let reporter = ProgressReporter::new(self.messenger.clone(), status);

        // Held until the flow ends, success or not.
        let _guard = self.locks.lock_set(set).await;

        let dir = self.store.locate(set);
        let current = storage::inspect(&dir).await?;
        if let SetStatus::Complete(marker) = &current {
            info!(
                set = %set,
                chat_id = chat_id.0,
                downloaded_at = %marker.downloaded_at,
                "sticker set already downloaded"
            );
            reporter.report(&already_downloaded_text(set)).await?;
            return Ok(FlowOutcome::AlreadyDone);
        }

        attempt.stage = Stage::Fetching;
        let descriptors = self.source.fetch_set(set).await?;
        info!(set = %set, chat_id = chat_id.0, count = descriptors.len(), "fetched sticker set");

        attempt.stage = Stage::Downloading;
        storage::prepare(&dir, &current).await?;
        let report = download::run(
            self.source.as_ref(),
            &reporter,
            set,
            &dir,
            &descriptors,
            self.progress_every,
        )
        .await?;

        if report.is_complete() {
            let marker = CompletionMarker::new(set, report.total, report.written);
            storage::mark_complete(&dir, &marker).await?;
        } else {
            warn!(
                set = %set,
                skipped = report.skipped,
                "not marking set complete, stickers were skipped"
            );
        }

        reporter.report(&completed_text(set, &report)).await?;
        Ok(FlowOutcome::Completed(report))
    }
}
