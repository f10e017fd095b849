use std::path::Path;

use teloxide::types::Message;

use ssb_core::{domain::ChatId, messaging::port::MessagingPort, Result};

use crate::router::AppState;

use super::HINT_TEXT;

fn parse_command(text: &str) -> String {
    // Telegram may send `/cmd@botname arg1 ...`
    let first = text.split_whitespace().next().unwrap_or("");

    first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

fn help_text(storage_root: &Path) -> String {
    format!(
        "👋 {HINT_TEXT}\n\n\
Every sticker of the set is written to {}/<set name>/.\n\
Sets that were already saved are not downloaded again.",
        storage_root.display()
    )
}

pub async fn handle_command(msg: &Message, text: &str, state: &AppState) -> Result<()> {
    let chat_id = ChatId(msg.chat.id.0);

    let reply = match parse_command(text).as_str() {
        "start" | "help" => help_text(state.flow.store().root()),
        _ => HINT_TEXT.to_string(),
    };

    state.messenger.send_text(chat_id, &reply).await?;
    Ok(())
}
