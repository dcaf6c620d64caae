//! Telegram webhook handler

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::{debug, error, warn};

use tally_core::conversation::messages;
use tally_core::{Reply, Update};

use crate::{AppError, AppState};

/// Acknowledgement returned to Telegram
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
}

/// POST /api/webhook - Handle one Telegram update
///
/// Well-formed updates are always acknowledged with 200, including when
/// handling fails, so Telegram does not redeliver them. The user gets a
/// generic error reply instead.
pub async fn receive_update(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected malformed update");
        AppError::bad_request("Malformed update")
    })?;

    let Some((chat, text)) = update.text_message() else {
        debug!(update_id = update.update_id, "Ignoring update without text");
        return Ok(Json(WebhookAck { ok: true }));
    };

    let replies = match state.conversation.respond(chat, text).await {
        Ok(replies) => replies,
        Err(e) => {
            error!(chat = %chat, update_id = update.update_id, error = %e, "Failed to handle message");
            vec![Reply::text(messages::ERROR)]
        }
    };

    for reply in &replies {
        if let Err(e) = state.messenger.deliver(chat, reply).await {
            error!(chat = %chat, error = %e, "Failed to deliver reply");
        }
    }

    Ok(Json(WebhookAck { ok: true }))
}
