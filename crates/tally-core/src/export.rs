//! Export of a whole store as CSV
//!
//! One row per expense with the owning partition in the first column.
//! Partitions are written oldest first and expenses in insertion order, so an
//! unchanged store always exports to the same bytes.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::COLUMNS;

/// A file ready to be sent to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Render every partition of the store as CSV
pub fn export_csv(db: &Database) -> Result<Vec<u8>> {
    let conn = db.conn()?;
    let mut stmt = conn.prepare(
        r#"
        SELECT p.name, e.id, e.name, e.amount, e.category, e.date
        FROM partitions p
        JOIN expenses e ON e.sheet = p.name
        ORDER BY p.year, p.month, e.seq
        "#,
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok([
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ])
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["Sheet"];
    header.extend(COLUMNS);
    writer.write_record(&header)?;
    for row in &rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}
