use anyhow::Result;
use colored::Colorize;
use ecocharge_client::ClientConfig;
use serde_json::json;

use crate::cli::ConfigCommands;
use crate::commands::Context;
use crate::output::{self, success};

pub fn handle_config_command(cmd: ConfigCommands, ctx: &Context) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Set { key, value } => set_config_value(ctx, &key, &value),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = ctx.client.config();
    let logged_in = ctx.client.is_logged_in()?;

    if ctx.json {
        return output::print_json(&json!({
            "baseUrl": config.base_url,
            "feedUrl": config.feed_base(),
            "timeoutSecs": config.timeout_secs,
            "dataDir": config.data_dir,
            "loggedIn": logged_in,
        }));
    }

    println!("{}", "Client Configuration:".cyan().bold());
    println!("  API URL: {}", config.base_url);
    let feed_note = if config.feed_url.is_none() { " (default)" } else { "" };
    println!("  Feed URL: {}{}", config.feed_base(), feed_note.dimmed());
    println!("  Timeout: {}s", config.timeout_secs);
    println!("  Data dir: {}", config.data_dir.display());
    println!("  Session: {}", if logged_in { "active".green() } else { "none".yellow() });
    Ok(())
}

/// Persist one setting. Flags and env overrides of this run are not written.
fn set_config_value(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = ClientConfig::load(&ctx.client.config().data_dir)?;
    apply_setting(&mut config, key, value)?;
    config.save()?;

    success(&format!("Config updated: {} = {}", key, value));
    Ok(())
}

fn apply_setting(config: &mut ClientConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "base_url" | "api_url" => config.base_url = value.to_string(),
        "feed_url" => {
            config.feed_url = match value.trim() {
                "" | "default" => None,
                url => Some(url.to_string()),
            };
        },
        "timeout_secs" | "timeout" => {
            config.timeout_secs = value
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid number of seconds: {}", value))?;
        },
        _ => anyhow::bail!("Unknown config key: {} (expected base_url, feed_url or timeout_secs)", key),
    }
    config.normalize();
    config.check()?;
    Ok(())
}
