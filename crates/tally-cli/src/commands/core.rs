//! Shared command utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tally_core::RecordStore;

/// Platform data directory for stores, e.g. `~/.local/share/tally/users`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
        .join("users")
}

/// Open the store registry rooted at `data_dir`
pub fn open_store(data_dir: &Path) -> Result<RecordStore> {
    RecordStore::new(data_dir)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))
}
