//! Per-user expense store with connection pooling and schema setup
//!
//! One `Database` is one chat's container. It holds the `Template`
//! partition, one partition per month that has seen a write, and the
//! expense rows themselves. Submodules:
//! - `expenses` - Partition reads, appends, deletes and replacements

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::info;

use crate::error::{Error, Result};
use crate::partition::TEMPLATE_PARTITION;

mod expenses;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// How long a connection waits on a locked database file
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A single chat's expense store
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: PathBuf,
    /// Serializes read-modify-write operations on this store
    write_lock: Arc<Mutex<()>>,
}

impl Database {
    /// Open the store at `path`, creating the file and template partition if absent
    pub fn open(path: &Path) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });
        let pool = Pool::builder().max_size(4).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Create a throwaway store (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` so every pooled
    /// connection sees the same data.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "tally_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::open(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Take the store's write lock. Held for the whole of a mutation.
    pub(crate) fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| Error::Lock(e.to_string()))
    }

    /// Create tables and the template partition
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the single writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Partitions (the template plus one per month)
            CREATE TABLE IF NOT EXISTS partitions (
                name TEXT PRIMARY KEY,
                year INTEGER,                      -- NULL for the template
                month INTEGER,                     -- NULL for the template
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_partitions_period ON partitions(year, month);

            -- Expenses (ID, Name, Amount, Category, Date)
            CREATE TABLE IF NOT EXISTS expenses (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,  -- insertion order
                sheet TEXT NOT NULL REFERENCES partitions(name),  -- owning partition
                id TEXT NOT NULL,
                name TEXT NOT NULL,
                amount TEXT NOT NULL,                   -- as entered
                category TEXT NOT NULL,
                date TEXT NOT NULL,                     -- as entered, dd-mm-yyyy
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(sheet, id)
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_sheet ON expenses(sheet);
            "#,
        )?;

        let created = conn.execute(
            "INSERT OR IGNORE INTO partitions (name, year, month) VALUES (?, NULL, NULL)",
            params![TEMPLATE_PARTITION],
        )?;
        if created > 0 {
            info!(path = %self.db_path.display(), "Created expense store");
        }

        Ok(())
    }
}
