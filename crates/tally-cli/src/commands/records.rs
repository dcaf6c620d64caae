//! Local admin commands over a chat's store
//!
//! These read the same files the bot writes. They never create a store for a
//! chat that doesn't have one yet.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tally_core::conversation::messages;
use tally_core::{monthly_stats, ChatId, Database, PartitionKey, RecordStore};

fn existing_store(store: &RecordStore, chat: ChatId) -> Result<Database> {
    if !store.exists(chat) {
        bail!(
            "No store for chat {} in {}",
            chat,
            store.data_dir().display()
        );
    }
    store
        .ensure_store(chat)
        .with_context(|| format!("Failed to open store for chat {}", chat))
}

pub fn cmd_months(store: &RecordStore, chat: ChatId) -> Result<()> {
    let db = existing_store(store, chat)?;
    let partitions = db.list_partitions()?;

    if partitions.is_empty() {
        println!("No expenses recorded for chat {}.", chat);
        return Ok(());
    }

    println!();
    println!("📅 Months for chat {}", chat);
    println!("   ─────────────────────────");
    for summary in &partitions {
        println!(
            "   {}  {:>4} expense(s)",
            summary.key.label(),
            summary.expense_count
        );
    }

    Ok(())
}

pub fn cmd_view(store: &RecordStore, chat: ChatId, month: &str) -> Result<()> {
    let key = PartitionKey::parse_month_year(month)?;
    let expenses = existing_store(store, chat)?.read_partition(&key)?;

    if expenses.is_empty() {
        println!("{}", messages::no_data(&key));
    } else {
        println!("{}", messages::expense_list(&key, &expenses));
    }

    Ok(())
}

pub fn cmd_stats(store: &RecordStore, chat: ChatId, month: &str) -> Result<()> {
    let key = PartitionKey::parse_month_year(month)?;
    let expenses = existing_store(store, chat)?.read_partition(&key)?;

    if expenses.is_empty() {
        println!("{}", messages::no_data(&key));
    } else {
        let stats = monthly_stats(&expenses)
            .with_context(|| format!("Failed to total {}", key.label()))?;
        println!("{}", messages::stats(&key, &stats));
    }

    Ok(())
}

/// Write the chat's store as CSV. Returns the path written.
pub fn cmd_export(store: &RecordStore, chat: ChatId, output: Option<&Path>) -> Result<PathBuf> {
    existing_store(store, chat)?;
    let file = store.export_store(chat)?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&file.file_name));
    std::fs::write(&path, &file.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Exported chat {} to {}", chat, path.display());
    Ok(path)
}
