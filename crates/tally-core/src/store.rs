//! Registry of per-chat stores
//!
//! Each chat identity gets its own database file, `expenses_{chat_id}.db`,
//! inside the data directory. Files are created on first access and the open
//! handles are kept for the life of the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::export::{export_csv, ExportFile};
use crate::models::ChatId;

pub struct RecordStore {
    data_dir: PathBuf,
    open: Mutex<HashMap<ChatId, Database>>,
}

impl RecordStore {
    /// Create a registry rooted at `data_dir`, creating the directory if needed
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        info!(data_dir = %data_dir.display(), "Record store ready");
        Ok(Self {
            data_dir,
            open: Mutex::new(HashMap::new()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Deterministic file location for a chat's store
    pub fn store_path(&self, chat: ChatId) -> PathBuf {
        self.data_dir.join(format!("expenses_{}.db", chat))
    }

    /// Whether a chat already has a store on disk
    pub fn exists(&self, chat: ChatId) -> bool {
        self.store_path(chat).exists()
    }

    /// Get the chat's store, creating it with only the template partition if absent
    pub fn ensure_store(&self, chat: ChatId) -> Result<Database> {
        let mut open = self.open.lock().map_err(|e| Error::Lock(e.to_string()))?;
        if let Some(db) = open.get(&chat) {
            return Ok(db.clone());
        }

        // The pool would retry a missing directory until it times out
        if !self.data_dir.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("data directory {} is missing", self.data_dir.display()),
            )));
        }

        let db = Database::open(&self.store_path(chat))?;
        open.insert(chat, db.clone());
        Ok(db)
    }

    /// Render the chat's whole store as a downloadable file
    pub fn export_store(&self, chat: ChatId) -> Result<ExportFile> {
        let db = self.ensure_store(chat)?;
        let _guard = db.lock_writes()?;
        Ok(ExportFile {
            file_name: format!("expenses_{}.csv", chat),
            content_type: "text/csv".to_string(),
            bytes: export_csv(&db)?,
        })
    }
}
