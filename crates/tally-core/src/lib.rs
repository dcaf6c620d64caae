//! Tally Core Library
//!
//! Shared functionality for the Tally expense bot:
//! - Per-chat record stores with monthly partitions
//! - Expense input parsing and partition resolution
//! - Category aggregation and VND formatting
//! - Conversation flow with per-chat pending prompts
//! - Telegram Bot API client
//! - CSV export

pub mod aggregate;
pub mod conversation;
pub mod db;
pub mod error;
pub mod export;
pub mod format;
pub mod input;
pub mod messenger;
pub mod models;
pub mod partition;
pub mod store;

/// Test utilities including a mock Telegram Bot API server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{distinct_categories, monthly_stats, sum_by_category, CategoryFilter, MonthlyStats};
pub use conversation::{Conversation, Reply, DEFAULT_PROMPT_TIMEOUT};
pub use db::Database;
pub use error::{Error, Result};
pub use export::ExportFile;
pub use format::format_vnd;
pub use input::parse_expense;
pub use messenger::{Messenger, RecordingMessenger, TelegramClient, Update};
pub use models::{ChatId, Expense, NewExpense, PartitionSummary};
pub use partition::{resolve_partition, ExpenseDate, PartitionKey};
pub use store::RecordStore;
