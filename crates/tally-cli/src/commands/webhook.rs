//! Webhook registration command

use anyhow::{Context, Result};
use tally_core::TelegramClient;

pub async fn cmd_set_webhook(
    token: &str,
    api_url: &str,
    url: &str,
    webhook_secret: Option<&str>,
) -> Result<()> {
    println!("🔗 Registering webhook {}...", url);

    let client = TelegramClient::new(token, api_url);
    client
        .set_webhook(url, webhook_secret)
        .await
        .context("Failed to register webhook")?;

    println!("✅ Webhook registered");
    if webhook_secret.is_none() {
        println!("   💡 Tip: Set TALLY_WEBHOOK_SECRET so the server can verify updates");
    }

    Ok(())
}
