//! CLI administration tool for clickgate.
//!
//! Inspects and clears sliding-window rate limits in the shared Redis store,
//! and signs or verifies webhook payloads the same way the dispatcher does.
//!
//! # Usage
//!
//! ```bash
//! # List tracked rate-limit keys
//! cargo run --bin clickgate-admin -- ratelimits list
//!
//! # Clear a key (asks for confirmation unless -y)
//! cargo run --bin clickgate-admin -- ratelimits reset ip:203.0.113.7
//!
//! # Sign a payload file
//! cargo run --bin clickgate-admin -- webhook sign --secret s3cr3t payload.json
//!
//! # Check a signature received by a subscriber
//! cargo run --bin clickgate-admin -- webhook verify --secret s3cr3t --signature <hex> payload.json
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL` or `REDIS_HOST`/`REDIS_PORT`/`REDIS_PASSWORD`/`REDIS_DB`:
//!   required by the `ratelimits` commands

use clickgate::application::services::RateLimiter;
use clickgate::config::Config;
use clickgate::domain::clock::SystemClock;
use clickgate::infrastructure::rate_limit::RedisWindowStore;
use clickgate::utils::signature;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI tool for operating clickgate.
#[derive(Parser)]
#[command(name = "clickgate-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect and reset rate limits
    Ratelimits {
        #[command(subcommand)]
        action: RateLimitAction,
    },

    /// Sign and verify webhook payloads
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
}

/// Rate limit subcommands.
#[derive(Subcommand)]
enum RateLimitAction {
    /// List tracked keys with their current count
    List,

    /// Clear the window of one key
    Reset {
        /// Key to clear, e.g. "ip:203.0.113.7" or "link:promo"
        key: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Webhook signature subcommands.
#[derive(Subcommand)]
enum WebhookAction {
    /// Print the X-Webhook-Signature value for a payload file
    Sign {
        /// Subscriber secret
        #[arg(short, long)]
        secret: String,

        /// File holding the raw JSON body
        file: PathBuf,
    },

    /// Check a signature against a payload file
    Verify {
        /// Subscriber secret
        #[arg(short, long)]
        secret: String,

        /// Hex signature from the X-Webhook-Signature header
        #[arg(long)]
        signature: String,

        /// File holding the raw JSON body
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ratelimits { action } => handle_rate_limit_action(action).await?,
        Commands::Webhook { action } => handle_webhook_action(action)?,
    }

    Ok(())
}

async fn connect_rate_limiter() -> Result<RateLimiter> {
    let redis_url = Config::load_redis_url().context("REDIS_URL must be set")?;

    let store = RedisWindowStore::connect(&redis_url)
        .await
        .context("Failed to connect to Redis")?;

    Ok(RateLimiter::new(Arc::new(store), Arc::new(SystemClock)))
}

/// Dispatches rate limit commands.
async fn handle_rate_limit_action(action: RateLimitAction) -> Result<()> {
    let limiter = connect_rate_limiter().await?;

    match action {
        RateLimitAction::List => list_rate_limits(&limiter).await?,
        RateLimitAction::Reset { key, yes } => reset_rate_limit(&limiter, key, yes).await?,
    }

    Ok(())
}

/// Lists tracked keys.
///
/// # Output Format
///
/// ```text
/// 📋 Rate Limits
///
///   Key                                      Count    Expires
///   ──────────────────────────────────────────────────────────────────
///   ip:203.0.113.7                           12       2025-01-01 12:01:00
/// ```
async fn list_rate_limits(limiter: &RateLimiter) -> Result<()> {
    println!("{}", "📋 Rate Limits".bright_blue().bold());
    println!();

    let mut items = limiter
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list rate limits: {}", e))?;

    if items.is_empty() {
        println!("{}", "  No tracked keys".yellow());
        return Ok(());
    }

    items.sort_by(|a, b| a.key.cmp(&b.key));

    println!(
        "  {:<40} {:<8} {:<20}",
        "Key".bright_white().bold(),
        "Count".bright_white().bold(),
        "Expires".bright_white().bold()
    );
    println!("  {}", "─".repeat(70).bright_black());

    for item in &items {
        println!(
            "  {:<40} {:<8} {}",
            item.key.cyan(),
            item.count.to_string().bright_white(),
            item.expires_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!(
        "  Total: {}",
        items.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Clears one key after confirmation (default: No).
async fn reset_rate_limit(limiter: &RateLimiter, key: String, skip_confirm: bool) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Key must not be empty");
    }

    println!("{}", "🔓 Reset Rate Limit".bright_blue().bold());
    println!();
    println!("  Key: {}", key.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Reset this key?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    limiter
        .reset(key)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to reset rate limit: {}", e))?;

    println!("{}", "✅ Rate limit reset".green().bold());
    println!();

    Ok(())
}

/// Dispatches webhook signature commands.
fn handle_webhook_action(action: WebhookAction) -> Result<()> {
    match action {
        WebhookAction::Sign { secret, file } => {
            let payload = read_payload(&file)?;
            println!("{}", signature::sign(&payload, &secret));
        }
        WebhookAction::Verify {
            secret,
            signature: provided,
            file,
        } => {
            let payload = read_payload(&file)?;

            if signature::verify(&payload, &provided, &secret) {
                println!("{}", "✅ Signature valid".green().bold());
            } else {
                println!("{}", "❌ Signature invalid".red().bold());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn read_payload(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
