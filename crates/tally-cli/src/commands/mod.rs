//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_store, default_data_dir)
//! - `records` - Local admin commands over a chat's store (months, view, stats, export)
//! - `serve` - Webhook server command
//! - `webhook` - Webhook registration with Telegram

pub mod core;
pub mod records;
pub mod serve;
pub mod webhook;

// Re-export command functions for main.rs
pub use core::*;
pub use records::*;
pub use serve::*;
pub use webhook::*;
