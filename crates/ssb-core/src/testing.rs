//! In-memory port implementations shared by the unit tests.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef, StickerDescriptor, StickerSetName},
    errors::{Error, PlatformErrorKind, ServiceCall},
    messaging::port::MessagingPort,
    ports::StickerSource,
    Result,
};

pub fn descriptors(n: usize) -> Vec<StickerDescriptor> {
    (0..n)
        .map(|i| StickerDescriptor {
            file_id: format!("file-{i}"),
            ordinal: i,
        })
        .collect()
}

fn index_of(file_ref: &str) -> usize {
    file_ref
        .trim_end_matches(".webp")
        .rsplit(|c: char| c == '-' || c == '_')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(usize::MAX)
}

#[derive(Default)]
pub struct FakeSource {
    set_name: String,
    size: usize,
    unresolvable: HashSet<usize>,
    failing_transport: Option<usize>,
    fail_fetch_set: bool,
    fetch_set_delay: Option<Duration>,
    fetch_set_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_set(name: &str, size: usize) -> Self {
        Self {
            set_name: name.to_string(),
            size,
            ..Default::default()
        }
    }

    pub fn unresolvable(mut self, idx: usize) -> Self {
        self.unresolvable.insert(idx);
        self
    }

    pub fn failing_transport(mut self, idx: usize) -> Self {
        self.failing_transport = Some(idx);
        self
    }

    pub fn failing_fetch_set(mut self) -> Self {
        self.fail_fetch_set = true;
        self
    }

    pub fn slow_fetch_set(mut self, delay: Duration) -> Self {
        self.fetch_set_delay = Some(delay);
        self
    }

    pub fn fetch_set_calls(&self) -> usize {
        self.fetch_set_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StickerSource for FakeSource {
    async fn fetch_set(&self, name: &StickerSetName) -> Result<Vec<StickerDescriptor>> {
        self.fetch_set_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.fetch_set_delay {
            tokio::time::sleep(d).await;
        }
        if self.fail_fetch_set {
            return Err(Error::service(ServiceCall::FetchSet, "STICKERSET_INVALID"));
        }
        if name.as_str() != self.set_name {
            return Err(Error::service(ServiceCall::FetchSet, "unknown set"));
        }
        Ok(descriptors(self.size))
    }

    async fn resolve_file(&self, file_id: &str) -> Result<Option<String>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let idx = index_of(file_id);
        if self.unresolvable.contains(&idx) {
            return Ok(None);
        }
        Ok(Some(format!("stickers/file_{idx}.webp")))
    }

    async fn fetch_bytes(&self, remote_path: &str) -> Result<Vec<u8>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let idx = index_of(remote_path);
        if self.failing_transport == Some(idx) {
            return Err(Error::service(ServiceCall::Transport, "connection reset"));
        }
        Ok(format!("sticker {idx}").into_bytes())
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    sends: Mutex<Vec<(ChatId, String)>>,
    edits: Mutex<Vec<(MessageRef, String)>>,
    fail_sends: bool,
}

impl FakeMessenger {
    pub fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Default::default()
        }
    }

    pub fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn edits(&self) -> Vec<String> {
        self.edits
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn edited_messages(&self) -> HashSet<MessageRef> {
        self.edits.lock().unwrap().iter().map(|(m, _)| *m).collect()
    }

    pub fn last_edit(&self) -> Option<String> {
        self.edits().pop()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        if self.fail_sends {
            return Err(Error::messaging(
                PlatformErrorKind::Protocol,
                "chat not found",
            ));
        }
        self.sends.lock().unwrap().push((chat_id, text.to_string()));
        Ok(self.alloc(chat_id))
    }

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()> {
        self.edits.lock().unwrap().push((msg, text.to_string()));
        Ok(())
    }
}
