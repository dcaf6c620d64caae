//! Tally CLI - Telegram expense tracker
//!
//! Usage:
//!   tally serve --port 3000            Start the webhook server
//!   tally set-webhook URL              Register the webhook with Telegram
//!   tally view CHAT 03-2024            List a chat's expenses for a month
//!   tally export CHAT -o out.csv       Export a chat's store

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let data_dir = cli.data_dir.unwrap_or_else(commands::default_data_dir);

    match cli.command {
        Commands::Serve {
            token,
            port,
            host,
            webhook_secret,
            webhook_url,
            api_url,
            prompt_timeout_secs,
        } => {
            commands::cmd_serve(commands::ServeOptions {
                data_dir: &data_dir,
                token: &token,
                api_url: &api_url,
                host: &host,
                port,
                webhook_secret,
                webhook_url: webhook_url.as_deref(),
                prompt_timeout_secs,
            })
            .await
        }
        Commands::SetWebhook {
            url,
            token,
            webhook_secret,
            api_url,
        } => commands::cmd_set_webhook(&token, &api_url, &url, webhook_secret.as_deref()).await,
        Commands::Months { chat } => {
            let store = commands::open_store(&data_dir)?;
            commands::cmd_months(&store, chat)
        }
        Commands::View { chat, month } => {
            let store = commands::open_store(&data_dir)?;
            commands::cmd_view(&store, chat, &month)
        }
        Commands::Stats { chat, month } => {
            let store = commands::open_store(&data_dir)?;
            commands::cmd_stats(&store, chat, &month)
        }
        Commands::Export { chat, output } => {
            let store = commands::open_store(&data_dir)?;
            commands::cmd_export(&store, chat, output.as_deref()).map(|_| ())
        }
    }
}
