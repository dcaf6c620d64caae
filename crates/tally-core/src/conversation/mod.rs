//! Conversation flow
//!
//! Turns one inbound chat message into the replies to send back. Multi-step
//! commands (`/add`, `/view`, `/delete`, `/edit`, `/stats`) either take their
//! argument inline or prompt for it and wait for the chat's next message.
//!
//! A bad answer to a prompt gets an explanation and the prompt stays open.
//! Any command cancels whatever the chat was waiting for.

mod command;
pub mod messages;
mod pending;

pub use command::{classify, Command, Input};
pub use pending::{Lookup, MonthAction, PendingInputs, Step, DEFAULT_PROMPT_TIMEOUT};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::aggregate::monthly_stats;
use crate::error::{Error, Result};
use crate::export::ExportFile;
use crate::input::parse_expense;
use crate::models::ChatId;
use crate::partition::PartitionKey;
use crate::store::RecordStore;

/// One outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Document(ExportFile),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The text of a text reply
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Document(_) => None,
        }
    }
}

pub struct Conversation {
    store: Arc<RecordStore>,
    pending: PendingInputs,
}

impl Conversation {
    pub fn new(store: Arc<RecordStore>, prompt_timeout: Duration) -> Self {
        Self {
            store,
            pending: PendingInputs::new(prompt_timeout),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn pending(&self) -> &PendingInputs {
        &self.pending
    }

    /// Handle one text message from `chat`
    pub async fn respond(&self, chat: ChatId, text: &str) -> Result<Vec<Reply>> {
        match classify(text) {
            Input::Command(Command::Cancel, _) => {
                let reply = if self.pending.clear(chat).await {
                    messages::CANCELLED
                } else {
                    messages::NOTHING_TO_CANCEL
                };
                Ok(vec![Reply::text(reply)])
            }
            Input::Command(command, args) => {
                self.pending.clear(chat).await;
                debug!(chat = %chat, command = %command, "Running command");
                self.run_command(chat, command, args).await
            }
            Input::UnknownCommand(name) => Ok(vec![Reply::text(messages::unknown_command(name))]),
            Input::Text(text) => match self.pending.take(chat).await {
                Lookup::Active(step) => self.answer(chat, step, text).await,
                Lookup::Expired => Ok(vec![Reply::text(messages::PROMPT_EXPIRED)]),
                Lookup::Idle => Ok(vec![Reply::text(messages::IDLE_HINT)]),
            },
        }
    }

    async fn run_command(
        &self,
        chat: ChatId,
        command: Command,
        args: Option<&str>,
    ) -> Result<Vec<Reply>> {
        let month_action = match command {
            Command::Start => return Ok(vec![Reply::text(messages::WELCOME)]),
            Command::Help => return Ok(vec![Reply::text(messages::HELP)]),
            Command::Export => {
                let file = self.store.export_store(chat)?;
                info!(chat = %chat, bytes = file.bytes.len(), "Exported store");
                return Ok(vec![Reply::Document(file)]);
            }
            Command::Add => {
                return match args {
                    Some(args) => self.answer(chat, Step::AwaitingExpense, args).await,
                    None => self.prompt(chat, Step::AwaitingExpense, messages::add_prompt()).await,
                };
            }
            // Handled before dispatch
            Command::Cancel => return Ok(vec![Reply::text(messages::NOTHING_TO_CANCEL)]),
            Command::View => MonthAction::View,
            Command::Delete => MonthAction::Delete,
            Command::Edit => MonthAction::Edit,
            Command::Stats => MonthAction::Stats,
        };

        let step = Step::AwaitingMonth(month_action);
        match args {
            Some(args) => self.answer(chat, step, args).await,
            None => {
                let text = match month_action {
                    MonthAction::Stats => messages::STATS_PROMPT,
                    _ => messages::MONTH_PROMPT,
                };
                self.prompt(chat, step, text).await
            }
        }
    }

    async fn prompt(&self, chat: ChatId, step: Step, text: impl Into<String>) -> Result<Vec<Reply>> {
        self.pending.set(chat, step).await;
        Ok(vec![Reply::text(text)])
    }

    /// Apply `text` as the answer to `step`. Invalid answers re-open the step.
    async fn answer(&self, chat: ChatId, step: Step, text: &str) -> Result<Vec<Reply>> {
        let result = match &step {
            Step::AwaitingExpense => self.add(chat, text),
            Step::AwaitingMonth(action) => self.month_selected(chat, *action, text).await,
            Step::AwaitingDeleteId(key) => self.delete(chat, key, text),
            Step::AwaitingEditId(key) => self.edit_selected(chat, key, text).await,
            Step::AwaitingEditFields { key, id } => self.edit(chat, key, id, text),
        };

        match result {
            Err(Error::InvalidInput(reason)) => {
                debug!(chat = %chat, reason = %reason, "Rejected answer");
                self.pending.set(chat, step).await;
                Ok(vec![Reply::text(messages::invalid(&reason))])
            }
            other => other,
        }
    }

    fn add(&self, chat: ChatId, text: &str) -> Result<Vec<Reply>> {
        let expense = parse_expense(text)?;
        let stored = self.store.ensure_store(chat)?.append_expense(&expense)?;
        info!(chat = %chat, id = %stored.id, partition = %expense.partition(), "Added expense");
        Ok(vec![Reply::text(messages::added(&expense.partition(), &stored))])
    }

    async fn month_selected(
        &self,
        chat: ChatId,
        action: MonthAction,
        text: &str,
    ) -> Result<Vec<Reply>> {
        let key = PartitionKey::parse_month_year(text)?;
        let expenses = self.store.ensure_store(chat)?.read_partition(&key)?;
        if expenses.is_empty() {
            return Ok(vec![Reply::text(messages::no_data(&key))]);
        }

        match action {
            MonthAction::View => Ok(vec![Reply::text(messages::expense_list(&key, &expenses))]),
            MonthAction::Stats => match monthly_stats(&expenses) {
                Ok(stats) => Ok(vec![Reply::text(messages::stats(&key, &stats))]),
                Err(Error::InvalidInput(reason)) => {
                    warn!(chat = %chat, partition = %key, "Stats unavailable");
                    Ok(vec![Reply::text(messages::stats_unavailable(&key, &reason))])
                }
                Err(e) => Err(e),
            },
            MonthAction::Delete => {
                self.pending.set(chat, Step::AwaitingDeleteId(key)).await;
                Ok(vec![
                    Reply::text(messages::expense_list(&key, &expenses)),
                    Reply::text(messages::DELETE_ID_PROMPT),
                ])
            }
            MonthAction::Edit => {
                self.pending.set(chat, Step::AwaitingEditId(key)).await;
                Ok(vec![
                    Reply::text(messages::expense_list(&key, &expenses)),
                    Reply::text(messages::EDIT_ID_PROMPT),
                ])
            }
        }
    }

    fn delete(&self, chat: ChatId, key: &PartitionKey, text: &str) -> Result<Vec<Reply>> {
        let id = expense_id(text)?;
        let removed = self.store.ensure_store(chat)?.delete_expense(key, id)?;
        info!(chat = %chat, partition = %key, id, removed, "Deleted expense");
        Ok(vec![Reply::text(messages::DELETED)])
    }

    async fn edit_selected(
        &self,
        chat: ChatId,
        key: &PartitionKey,
        text: &str,
    ) -> Result<Vec<Reply>> {
        let id = expense_id(text)?;
        match self.store.ensure_store(chat)?.get_expense(key, id)? {
            Some(expense) => {
                let step = Step::AwaitingEditFields {
                    key: *key,
                    id: expense.id.clone(),
                };
                self.pending.set(chat, step).await;
                Ok(vec![Reply::text(messages::edit_fields_prompt(&expense))])
            }
            None => Ok(vec![Reply::text(messages::not_found(key, id))]),
        }
    }

    fn edit(&self, chat: ChatId, key: &PartitionKey, id: &str, text: &str) -> Result<Vec<Reply>> {
        let expense = parse_expense(text)?;
        match self.store.ensure_store(chat)?.replace_expense(key, id, &expense)? {
            Some(updated) => {
                info!(chat = %chat, id = %updated.id, partition = %expense.partition(), "Edited expense");
                Ok(vec![Reply::text(messages::edited(&updated))])
            }
            None => Ok(vec![Reply::text(messages::not_found(key, id))]),
        }
    }
}

fn expense_id(text: &str) -> Result<&str> {
    let id = text.trim();
    if id.is_empty() {
        return Err(Error::invalid("Expense ID must not be empty"));
    }
    Ok(id)
}

#[cfg(test)]
mod tests;
