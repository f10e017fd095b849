//! Telegram update handlers.
//!
//! Stickers go to the core sticker flow; everything else gets a short hint
//! (private chats only, groups stay quiet).

use std::sync::Arc;

use teloxide::types::Message;

use ssb_core::{domain::ChatId, messaging::port::MessagingPort, Result};

use crate::router::AppState;

mod commands;
mod sticker;

pub const HINT_TEXT: &str = "Send me a sticker and I'll save its whole pack.";

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> Result<()> {
    if let Some(sticker) = msg.sticker() {
        return sticker::handle_sticker(&msg, sticker, &state).await;
    }

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(&msg, text, &state).await;
        }
    }

    if msg.chat.is_private() {
        state
            .messenger
            .send_text(ChatId(msg.chat.id.0), HINT_TEXT)
            .await?;
    }

    Ok(())
}
