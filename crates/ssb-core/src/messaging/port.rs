use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Outbound messaging port.
///
/// Telegram is the only implementation; the flow only ever sends plain text
/// and edits a message it sent earlier.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()>;
}
