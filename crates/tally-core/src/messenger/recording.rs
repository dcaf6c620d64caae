//! Messenger that records instead of sending

use std::sync::Mutex;

use async_trait::async_trait;

use super::Messenger;
use crate::error::{Error, Result};
use crate::export::ExportFile;
use crate::models::ChatId;

/// Something the recording messenger was asked to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat: ChatId, text: String },
    Document { chat: ChatId, file: ExportFile },
}

#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    /// When set, every send fails (for exercising error paths)
    pub failing: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A messenger whose sends always fail
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Everything sent so far
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Texts sent to one chat, in order
    pub fn texts_for(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { chat: c, text } if c == chat => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, item: Sent) -> Result<()> {
        if self.failing {
            return Err(Error::Telegram("recording messenger set to fail".into()));
        }
        self.sent
            .lock()
            .map_err(|e| Error::Lock(e.to_string()))?
            .push(item);
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()> {
        self.record(Sent::Text {
            chat,
            text: text.to_string(),
        })
    }

    async fn send_document(&self, chat: ChatId, file: &ExportFile) -> Result<()> {
        self.record(Sent::Document {
            chat,
            file: file.clone(),
        })
    }
}
