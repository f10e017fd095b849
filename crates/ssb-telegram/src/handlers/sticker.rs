use teloxide::types::{Message, Sticker};
use tracing::debug;

use ssb_core::{domain::ChatId, Result};

use crate::router::AppState;

pub async fn handle_sticker(msg: &Message, sticker: &Sticker, state: &AppState) -> Result<()> {
    let chat_id = ChatId(msg.chat.id.0);
    let outcome = state
        .flow
        .handle(chat_id, sticker.set_name.as_deref())
        .await?;

    debug!(chat_id = chat_id.0, ?outcome, "sticker handled");
    Ok(())
}
