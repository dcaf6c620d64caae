//! Server command implementation

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tally_core::{Conversation, TelegramClient};

use super::open_store;

/// Settings for `tally serve`
pub struct ServeOptions<'a> {
    pub data_dir: &'a Path,
    pub token: &'a str,
    pub api_url: &'a str,
    pub host: &'a str,
    pub port: u16,
    pub webhook_secret: Option<String>,
    pub webhook_url: Option<&'a str>,
    pub prompt_timeout_secs: u64,
}

pub async fn cmd_serve(options: ServeOptions<'_>) -> Result<()> {
    println!("🚀 Starting Tally webhook server...");
    println!("   Data directory: {}", options.data_dir.display());
    println!("   Listening: http://{}:{}", options.host, options.port);
    println!("   Bot API: {}", options.api_url);
    println!("   Prompt timeout: {}s", options.prompt_timeout_secs);

    if options.webhook_secret.is_some() {
        println!("   🔒 Webhook secret: configured (TALLY_WEBHOOK_SECRET)");
    } else {
        println!("   ⚠️  Webhook secret not set - any caller can post updates");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let store = open_store(options.data_dir)?;
    let client = Arc::new(TelegramClient::new(options.token, options.api_url));

    if let Some(url) = options.webhook_url {
        client
            .set_webhook(url, options.webhook_secret.as_deref())
            .await
            .context("Failed to register webhook")?;
        println!("   🔗 Webhook registered: {}", url);
    }

    let conversation = Conversation::new(
        Arc::new(store),
        Duration::from_secs(options.prompt_timeout_secs),
    );
    let config = tally_server::ServerConfig {
        webhook_secret: options.webhook_secret,
    };

    tally_server::serve_with_config(conversation, client, options.host, options.port, config)
        .await
}
