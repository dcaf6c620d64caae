//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tally_core::messenger::DEFAULT_API_URL;
use tally_core::ChatId;

/// Tally - Track expenses from a Telegram chat
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Telegram expense tracker with per-chat monthly stores", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding one store per chat (defaults to the platform data dir)
    #[arg(long, env = "TALLY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook server
    Serve {
        /// Telegram bot token
        #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
        token: String,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Secret Telegram must send with every update
        #[arg(long, env = "TALLY_WEBHOOK_SECRET", hide_env_values = true)]
        webhook_secret: Option<String>,

        /// Public URL of this server's webhook, registered on startup
        #[arg(long)]
        webhook_url: Option<String>,

        /// Bot API base URL
        #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,

        /// Seconds a prompt waits for its answer
        #[arg(long, default_value = "300")]
        prompt_timeout_secs: u64,
    },

    /// Register the webhook URL with Telegram
    SetWebhook {
        /// Public URL of the webhook endpoint (https://.../api/webhook)
        url: String,

        /// Telegram bot token
        #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
        token: String,

        /// Secret Telegram must send with every update
        #[arg(long, env = "TALLY_WEBHOOK_SECRET", hide_env_values = true)]
        webhook_secret: Option<String>,

        /// Bot API base URL
        #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },

    /// List the months a chat has expenses for
    Months {
        /// Chat id
        #[arg(allow_negative_numbers = true)]
        chat: ChatId,
    },

    /// List a chat's expenses for one month
    View {
        /// Chat id
        #[arg(allow_negative_numbers = true)]
        chat: ChatId,

        /// Month (mm-yyyy)
        month: String,
    },

    /// Show a chat's spending totals for one month
    Stats {
        /// Chat id
        #[arg(allow_negative_numbers = true)]
        chat: ChatId,

        /// Month (mm-yyyy)
        month: String,
    },

    /// Export a chat's whole store as CSV
    Export {
        /// Chat id
        #[arg(allow_negative_numbers = true)]
        chat: ChatId,

        /// Output file (defaults to expenses_<chat>.csv in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
