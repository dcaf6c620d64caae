//! Expense operations

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::Database;
use crate::error::Result;
use crate::models::{Expense, NewExpense, PartitionSummary};
use crate::partition::PartitionKey;

impl Database {
    /// Read a partition's expenses in insertion order.
    /// A partition that was never written reads as empty.
    pub fn read_partition(&self, key: &PartitionKey) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, amount, category, date FROM expenses WHERE sheet = ? ORDER BY seq",
        )?;
        let expenses = stmt
            .query_map(params![key.to_string()], row_to_expense)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(expenses)
    }

    /// Look up one expense by identifier
    pub fn get_expense(&self, key: &PartitionKey, id: &str) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        find_expense(&conn, &key.to_string(), id)
    }

    /// Append an expense to the partition of its date, creating the partition if needed
    pub fn append_expense(&self, expense: &NewExpense) -> Result<Expense> {
        let _guard = self.lock_writes()?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let key = expense.partition();
        let sheet = key.to_string();
        ensure_partition(&tx, &key)?;
        let id = unique_id(&tx, &sheet, Utc::now().timestamp_millis())?;
        let stored = insert_expense(&tx, &sheet, id, expense)?;

        tx.commit()?;
        info!(partition = %sheet, id = %stored.id, "Appended expense");
        Ok(stored)
    }

    /// Delete expenses with a matching identifier. Returns how many were removed.
    pub fn delete_expense(&self, key: &PartitionKey, id: &str) -> Result<usize> {
        let _guard = self.lock_writes()?;
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM expenses WHERE sheet = ? AND id = ?",
            params![key.to_string(), id],
        )?;
        info!(partition = %key, id, removed, "Deleted expense");
        Ok(removed)
    }

    /// Replace an expense's fields, keeping its identifier.
    ///
    /// If the new date falls in another month the expense moves to that
    /// partition. Returns `None` when nothing matched `id`.
    pub fn replace_expense(
        &self,
        key: &PartitionKey,
        id: &str,
        replacement: &NewExpense,
    ) -> Result<Option<Expense>> {
        let _guard = self.lock_writes()?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let sheet = key.to_string();
        if find_expense(&tx, &sheet, id)?.is_none() {
            return Ok(None);
        }

        let target = replacement.partition();
        let target_sheet = target.to_string();
        let stored = if target_sheet == sheet {
            tx.execute(
                "UPDATE expenses SET name = ?, amount = ?, category = ?, date = ? WHERE sheet = ? AND id = ?",
                params![
                    replacement.name,
                    replacement.amount,
                    replacement.category,
                    replacement.date.as_str(),
                    sheet,
                    id,
                ],
            )?;
            to_expense(id.to_string(), replacement)
        } else {
            tx.execute(
                "DELETE FROM expenses WHERE sheet = ? AND id = ?",
                params![sheet, id],
            )?;
            ensure_partition(&tx, &target)?;
            let new_id = if find_expense(&tx, &target_sheet, id)?.is_some() {
                unique_id(&tx, &target_sheet, Utc::now().timestamp_millis())?
            } else {
                id.to_string()
            };
            insert_expense(&tx, &target_sheet, new_id, replacement)?
        };

        tx.commit()?;
        info!(from = %sheet, to = %target_sheet, id = %stored.id, "Replaced expense");
        Ok(Some(stored))
    }

    /// Month partitions with their expense counts, oldest first. Excludes the template.
    pub fn list_partitions(&self) -> Result<Vec<PartitionSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.name, COUNT(e.seq)
            FROM partitions p
            LEFT JOIN expenses e ON e.sheet = p.name
            WHERE p.year IS NOT NULL
            GROUP BY p.name
            ORDER BY p.year, p.month
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(name, expense_count)| {
                PartitionKey::from_name(&name).map(|key| PartitionSummary { key, expense_count })
            })
            .collect())
    }

    /// Whether a partition has been created
    pub fn has_partition(&self, key: &PartitionKey) -> Result<bool> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM partitions WHERE name = ?)",
            params![key.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        date: row.get(4)?,
    })
}

fn to_expense(id: String, expense: &NewExpense) -> Expense {
    Expense {
        id,
        name: expense.name.clone(),
        amount: expense.amount.clone(),
        category: expense.category.clone(),
        date: expense.date.as_str().to_string(),
    }
}

fn find_expense(conn: &Connection, sheet: &str, id: &str) -> Result<Option<Expense>> {
    let expense = conn
        .query_row(
            "SELECT id, name, amount, category, date FROM expenses WHERE sheet = ? AND id = ?",
            params![sheet, id],
            row_to_expense,
        )
        .optional()?;
    Ok(expense)
}

/// Create a month partition if it does not exist yet
fn ensure_partition(conn: &Connection, key: &PartitionKey) -> Result<()> {
    let created = conn.execute(
        "INSERT OR IGNORE INTO partitions (name, year, month) VALUES (?, ?, ?)",
        params![key.to_string(), key.year(), key.month()],
    )?;
    if created > 0 {
        info!(partition = %key, "Created partition");
    }
    Ok(())
}

/// First identifier at or after `candidate` that is free in `sheet`
fn unique_id(conn: &Connection, sheet: &str, mut candidate: i64) -> Result<String> {
    loop {
        let id = candidate.to_string();
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM expenses WHERE sheet = ? AND id = ?)",
            params![sheet, id],
            |row| row.get(0),
        )?;
        if !taken {
            return Ok(id);
        }
        debug!(sheet, id = %id, "Expense id taken, bumping");
        candidate += 1;
    }
}

fn insert_expense(
    conn: &Connection,
    sheet: &str,
    id: String,
    expense: &NewExpense,
) -> Result<Expense> {
    conn.execute(
        r#"
        INSERT INTO expenses (sheet, id, name, amount, category, date)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
        params![
            sheet,
            id,
            expense.name,
            expense.amount,
            expense.category,
            expense.date.as_str(),
        ],
    )?;
    Ok(to_expense(id, expense))
}
