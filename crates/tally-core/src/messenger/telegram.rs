//! Telegram Bot API client and webhook payload types
//!
//! Only the slice of the API the bot uses: `sendMessage`, `sendDocument`
//! and `setWebhook`. The base URL is configurable so tests can point the
//! client at a local mock server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Messenger;
use crate::error::{Error, Result};
use crate::export::ExportFile;
use crate::models::ChatId;

/// Public Bot API endpoint
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram rejects messages longer than this many characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Inbound webhook update. Unused fields are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

impl Update {
    /// The chat and text of a text message, if this update carries one
    pub fn text_message(&self) -> Option<(ChatId, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        Some((ChatId(message.chat.id), text))
    }
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
    allowed_updates: [&'a str; 1],
}

#[derive(Clone)]
pub struct TelegramClient {
    http_client: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: &str, base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Base URL of the Bot API this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Register `url` as the bot's webhook, optionally with a secret token
    /// Telegram will echo in `X-Telegram-Bot-Api-Secret-Token`.
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let request = SetWebhookRequest {
            url,
            secret_token,
            allowed_updates: ["message"],
        };
        let response = self
            .http_client
            .post(self.method_url("setWebhook"))
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?;
        check_response("setWebhook", response).await?;
        info!(url, "Webhook registered");
        Ok(())
    }
}

/// Turn a Bot API response into `Ok(())` or `Error::Telegram`
async fn check_response(method: &str, response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body = response.text().await?;
    let parsed: ApiResponse = serde_json::from_str(&body).map_err(|_| {
        Error::Telegram(format!("{} returned {} with a non-JSON body", method, status))
    })?;

    if parsed.ok {
        debug!(method, "Bot API call succeeded");
        Ok(())
    } else {
        Err(Error::Telegram(format!(
            "{} failed ({}): {}",
            method,
            status,
            parsed.description.unwrap_or_else(|| "no description".into())
        )))
    }
}

/// Split text into chunks Telegram accepts, preferring line boundaries
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > max_chars {
            // A single overlong line is cut at character boundaries
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            let request = SendMessageRequest {
                chat_id: chat.0,
                text: &chunk,
            };
            let response = self
                .http_client
                .post(self.method_url("sendMessage"))
                .timeout(REQUEST_TIMEOUT)
                .json(&request)
                .send()
                .await?;
            check_response("sendMessage", response).await?;
        }
        Ok(())
    }

    async fn send_document(&self, chat: ChatId, file: &ExportFile) -> Result<()> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .text("chat_id", chat.0.to_string())
            .part("document", part);

        let response = self
            .http_client
            .post(self.method_url("sendDocument"))
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await?;
        check_response("sendDocument", response).await?;
        info!(chat = %chat, file = %file.file_name, bytes = file.bytes.len(), "Sent document");
        Ok(())
    }
}
