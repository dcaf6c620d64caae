//! HTTP request handlers

pub mod health;
pub mod webhook;

// Re-export all handlers for use in router
pub use health::*;
pub use webhook::*;
