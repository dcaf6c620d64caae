//! Per-chat pending prompts
//!
//! A chat is either idle or waiting for one specific answer. Only the same
//! chat can answer, and an answer that arrives after the prompt expired is
//! not consumed.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::models::ChatId;
use crate::partition::PartitionKey;

/// Default time a prompt waits for its answer
pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// What a month prompt was asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthAction {
    View,
    Delete,
    Edit,
    Stats,
}

/// The answer a chat is expected to send next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    AwaitingExpense,
    AwaitingMonth(MonthAction),
    AwaitingDeleteId(PartitionKey),
    AwaitingEditId(PartitionKey),
    AwaitingEditFields { key: PartitionKey, id: String },
}

#[derive(Debug, Clone)]
struct PendingInput {
    step: Step,
    expires_at: Instant,
}

impl PendingInput {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Result of looking up a chat's pending prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Active(Step),
    Expired,
    Idle,
}

#[derive(Debug)]
pub struct PendingInputs {
    timeout: Duration,
    entries: RwLock<HashMap<ChatId, PendingInput>>,
}

impl Default for PendingInputs {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_TIMEOUT)
    }
}

impl PendingInputs {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for `step` from `chat`, replacing whatever it was waiting for
    pub async fn set(&self, chat: ChatId, step: Step) {
        let mut entries = self.entries.write().await;

        // Clean up expired prompts while we're here
        entries.retain(|_, p| !p.is_expired());

        entries.insert(
            chat,
            PendingInput {
                step,
                expires_at: Instant::now() + self.timeout,
            },
        );
    }

    /// Remove and return the chat's pending step
    pub async fn take(&self, chat: ChatId) -> Lookup {
        let mut entries = self.entries.write().await;
        match entries.remove(&chat) {
            Some(pending) if pending.is_expired() => Lookup::Expired,
            Some(pending) => Lookup::Active(pending.step),
            None => Lookup::Idle,
        }
    }

    /// Drop the chat's pending step. Returns whether a live one existed.
    pub async fn clear(&self, chat: ChatId) -> bool {
        let mut entries = self.entries.write().await;
        entries
            .remove(&chat)
            .map(|p| !p.is_expired())
            .unwrap_or(false)
    }

    /// The chat's live pending step, without consuming it
    pub async fn peek(&self, chat: ChatId) -> Option<Step> {
        let entries = self.entries.read().await;
        entries
            .get(&chat)
            .filter(|p| !p.is_expired())
            .map(|p| p.step.clone())
    }

    /// Number of stored prompts, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
