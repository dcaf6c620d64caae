//! User-facing reply texts

use crate::aggregate::MonthlyStats;
use crate::format::format_vnd;
use crate::input::EXPENSE_FORMAT;
use crate::models::Expense;
use crate::partition::PartitionKey;

pub const WELCOME: &str = "Welcome to Tally, your expense tracker!\n\
Type /help to see what I can do.";

pub const HELP: &str = "Available commands:\n\
/add - Add an expense\n\
/view - List the expenses of a month\n\
/edit - Change an expense\n\
/delete - Delete an expense\n\
/stats - Spending totals for a month\n\
/export - Download all your expenses as a CSV file\n\
/cancel - Cancel the current prompt";

pub const MONTH_PROMPT: &str = "Enter the month and year (mm-yyyy):";
pub const STATS_PROMPT: &str = "Enter the month and year to see statistics (mm-yyyy):";
pub const DELETE_ID_PROMPT: &str = "Enter the ID of the expense to delete:";
pub const EDIT_ID_PROMPT: &str = "Enter the ID of the expense to edit:";

pub const DELETED: &str = "Expense deleted.";
pub const CANCELLED: &str = "Cancelled.";
pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";
pub const PROMPT_EXPIRED: &str =
    "That prompt has expired. Send the command again to start over.";
pub const IDLE_HINT: &str = "I didn't understand that. Type /help to see the available commands.";
pub const ERROR: &str = "Something went wrong. Please try again later.";

pub fn add_prompt() -> String {
    format!(
        "Enter the expense as: {}\nExample: Coffee, 50000, Food, 01-03-2024",
        EXPENSE_FORMAT
    )
}

pub fn unknown_command(name: &str) -> String {
    format!(
        "Unknown command /{}. Type /help to see the available commands.",
        name
    )
}

/// Validation failure; the prompt stays open
pub fn invalid(reason: &str) -> String {
    format!("{}\nPlease try again, or send /cancel.", reason)
}

pub fn added(key: &PartitionKey, expense: &Expense) -> String {
    format!(
        "Added {} ({} VND) on {} to {}. ID: {}",
        expense.name, expense.amount, expense.date, key, expense.id
    )
}

pub fn no_data(key: &PartitionKey) -> String {
    format!("No data for {}.", key.label())
}

pub fn not_found(key: &PartitionKey, id: &str) -> String {
    format!("No expense with ID {} in {}.", id, key.label())
}

fn expense_line(expense: &Expense) -> String {
    format!(
        "- [{}] {}: {} VND ({}, {})",
        expense.id, expense.name, expense.amount, expense.category, expense.date
    )
}

/// Listing of a month's expenses, one per line in insertion order
pub fn expense_list(key: &PartitionKey, expenses: &[Expense]) -> String {
    let mut lines = vec![format!("Expenses for {}:", key.label())];
    lines.extend(expenses.iter().map(expense_line));
    lines.join("\n")
}

pub fn stats(key: &PartitionKey, stats: &MonthlyStats) -> String {
    let mut lines = vec![
        format!("Spending for {}:", key.label()),
        format!("- Total: {}", format_vnd(stats.total)),
    ];
    for (category, sum) in &stats.by_category {
        lines.push(format!("- {}: {}", category, format_vnd(*sum)));
    }
    lines.join("\n")
}

pub fn stats_unavailable(key: &PartitionKey, reason: &str) -> String {
    format!("Can't total {}: {}.", key.label(), reason)
}

pub fn edit_fields_prompt(expense: &Expense) -> String {
    format!(
        "Current: {}, {}, {}, {}\nEnter the new values as: {}",
        expense.name, expense.amount, expense.category, expense.date, EXPENSE_FORMAT
    )
}

pub fn edited(expense: &Expense) -> String {
    format!(
        "Updated expense {}: {} ({} VND, {}, {})",
        expense.id, expense.name, expense.amount, expense.category, expense.date
    )
}
