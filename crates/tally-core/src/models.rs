//! Domain models for Tally

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::partition::{ExpenseDate, PartitionKey};

/// Column headers of a partition, in storage and export order
pub const COLUMNS: [&str; 5] = ["ID", "Name", "Amount", "Category", "Date"];

/// Telegram chat identity. Each chat owns one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| format!("Invalid chat id: {}", s))
    }
}

/// A stored expense row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Time-derived identifier, unique within its partition
    pub id: String,
    pub name: String,
    /// Amount as entered
    pub amount: String,
    pub category: String,
    /// Date as entered (dd-mm-yyyy)
    pub date: String,
}

impl Expense {
    /// Parse the stored amount. `None` if the row was edited into something non-numeric.
    pub fn amount_value(&self) -> Option<Decimal> {
        Decimal::from_str(self.amount.trim()).ok()
    }
}

/// A validated expense ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub name: String,
    /// Amount exactly as typed, already validated as a number
    pub amount: String,
    pub category: String,
    pub date: ExpenseDate,
}

impl NewExpense {
    /// The partition this expense belongs to, derived from its date
    pub fn partition(&self) -> PartitionKey {
        self.date.partition()
    }
}

/// A month partition and how many expenses it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionSummary {
    pub key: PartitionKey,
    pub expense_count: i64,
}
