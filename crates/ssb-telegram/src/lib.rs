//! Telegram adapter (teloxide).
//!
//! Implements the `ssb-core` ports over the Telegram Bot API: outbound
//! messaging, and the sticker service (sticker sets, file paths, file bytes).

use async_trait::async_trait;

use teloxide::{net::Download, prelude::*, RequestError};

pub mod handlers;
pub mod router;

use ssb_core::{
    domain::{ChatId, MessageId, MessageRef, StickerDescriptor, StickerSetName},
    errors::{Error, PlatformErrorKind, ServiceCall},
    messaging::port::MessagingPort,
    ports::StickerSource,
    Result,
};

fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat_id.0)
}

fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
    teloxide::types::MessageId(message_id.0)
}

pub fn classify_request_error(e: &RequestError) -> PlatformErrorKind {
    match e {
        RequestError::Api(_) | RequestError::MigrateToChatId(_) | RequestError::RetryAfter(_) => {
            PlatformErrorKind::Protocol
        }
        RequestError::Network(_) => PlatformErrorKind::Connectivity,
        _ => PlatformErrorKind::Other,
    }
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn map_err(e: RequestError) -> Error {
        Error::messaging(classify_request_error(&e), format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let msg = self
            .bot
            .send_message(tg_chat(chat_id), text.to_string())
            .await
            .map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(tg_chat(msg.chat_id), tg_msg_id(msg.message_id), text.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

/// Sticker sets and sticker files straight from the Bot API.
#[derive(Clone)]
pub struct TelegramStickerSource {
    bot: Bot,
}

impl TelegramStickerSource {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl StickerSource for TelegramStickerSource {
    async fn fetch_set(&self, name: &StickerSetName) -> Result<Vec<StickerDescriptor>> {
        let set = self
            .bot
            .get_sticker_set(name.as_str())
            .await
            .map_err(|e| Error::service(ServiceCall::FetchSet, e.to_string()))?;

        Ok(set
            .stickers
            .into_iter()
            .enumerate()
            .map(|(ordinal, sticker)| StickerDescriptor {
                file_id: sticker.file.id,
                ordinal,
            })
            .collect())
    }

    async fn resolve_file(&self, file_id: &str) -> Result<Option<String>> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|e| Error::service(ServiceCall::ResolveFile, e.to_string()))?;

        if file.path.is_empty() {
            return Ok(None);
        }
        Ok(Some(file.path))
    }

    async fn fetch_bytes(&self, remote_path: &str) -> Result<Vec<u8>> {
        let mut buf: Vec<u8> = Vec::new();
        self.bot
            .download_file(remote_path, &mut buf)
            .await
            .map_err(|e| Error::service(ServiceCall::Transport, e.to_string()))?;
        Ok(buf)
    }
}
