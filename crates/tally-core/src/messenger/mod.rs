//! Outbound chat transport
//!
//! - `Messenger` trait: what the conversation layer needs from a chat platform
//! - `TelegramClient`: Telegram Bot API over HTTPS
//! - `RecordingMessenger`: keeps everything it is asked to send (tests, dry runs)

mod recording;
pub mod telegram;

pub use recording::{RecordingMessenger, Sent};
pub use telegram::{TelegramClient, Update, DEFAULT_API_URL};

use async_trait::async_trait;

use crate::conversation::Reply;
use crate::error::Result;
use crate::export::ExportFile;
use crate::models::ChatId;

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()>;

    /// Send a file attachment
    async fn send_document(&self, chat: ChatId, file: &ExportFile) -> Result<()>;

    /// Deliver a conversation reply
    async fn deliver(&self, chat: ChatId, reply: &Reply) -> Result<()> {
        match reply {
            Reply::Text(text) => self.send_text(chat, text).await,
            Reply::Document(file) => self.send_document(chat, file).await,
        }
    }
}
