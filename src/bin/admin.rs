//! CLI administration tool for tinylink.
//!
//! Operates directly on the configured link store, without going through
//! the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List all links
//! cargo run --bin tinylink-admin -- list
//!
//! # Show one link
//! cargo run --bin tinylink-admin -- info abc
//!
//! # Delete a link (asks for confirmation unless -y)
//! cargo run --bin tinylink-admin -- delete abc
//!
//! # Purge expired links now
//! cargo run --bin tinylink-admin -- sweep
//!
//! # Check store connectivity
//! cargo run --bin tinylink-admin -- check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `STORE_BACKEND`, `STORE_PATH`, `REDIS_URL`, ...
//!
//! When the file backend is used, stop the server first: both processes
//! would otherwise rewrite the same snapshot.

use tinylink::application::services::LinkService;
use tinylink::config::{self, Config};
use tinylink::domain::entities::LinkInfo;
use tinylink::domain::expiry;
use tinylink::server::build_store;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing tinylink.
#[derive(Parser)]
#[command(name = "tinylink-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all links
    List,

    /// Show details of a link
    Info {
        /// Short code
        code: String,
    },

    /// Delete a link
    Delete {
        /// Short code
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Purge expired links now
    Sweep,

    /// Check store connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    let store = build_store(&config).await?;
    let service = LinkService::new(store, config.link_policy());

    match cli.command {
        Commands::List => list_links(&service, &config).await?,
        Commands::Info { code } => show_link(&service, &config, &code).await?,
        Commands::Delete { code, yes } => delete_link(&service, &code, yes).await?,
        Commands::Sweep => sweep(&service).await?,
        Commands::Check => check(&service).await?,
    }

    Ok(())
}

/// Prints every link as a table.
///
/// ```text
///   Code         Clicks   Expires              Target
///   ──────────────────────────────────────────────────────────────────
///   1            3        2025-01-08 10:30     https://example.com
///   promo        0        never                https://example.org/promo
/// ```
async fn list_links(service: &LinkService, config: &Config) -> Result<()> {
    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    let mut links = service.list_all().await?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    links.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.code.cmp(&b.code)));

    println!(
        "  {:<12} {:<8} {:<20} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        let expires = format_expiry(link);

        println!(
            "  {:<12} {:<8} {:<20} {}",
            link.code.cyan(),
            link.clicks.to_string().bright_white(),
            expires,
            link.target
        );
    }

    let expired = links.iter().filter(|l| l.is_expired).count();

    println!();
    println!(
        "  Total: {}  Expired: {}  Base URL: {}",
        links.len().to_string().bright_white().bold(),
        expired.to_string().yellow(),
        config.base_url.bright_black()
    );
    println!();

    Ok(())
}

async fn show_link(service: &LinkService, config: &Config, code: &str) -> Result<()> {
    let link = service.info(code).await?;

    println!("{}", "ℹ️  Link".bright_blue().bold());
    println!();
    println!("  Code:      {}", link.code.cyan());
    println!(
        "  Short URL: {}",
        service.get_short_url(&config.base_url, &link.code).bright_cyan()
    );
    println!("  Target:    {}", link.target);
    println!("  Clicks:    {}", link.clicks.to_string().bright_white().bold());
    println!(
        "  Created:   {}",
        link.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Expires:   {}", format_expiry(&link));
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(service: &LinkService, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Link".bright_blue().bold());
    println!();

    let link = service.info(code).await?;

    println!("  Code:   {}", link.code.cyan());
    println!("  Target: {}", link.target);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service.delete_code(code).await?;

    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}

async fn sweep(service: &LinkService) -> Result<()> {
    println!("{}", "🧹 Purging expired links...".bright_blue());

    let report = expiry::sweep(service.store().as_ref(), Utc::now()).await?;

    println!(
        "  Scanned: {}  Removed: {}  Failed: {}",
        report.scanned.to_string().bright_white(),
        report.removed.to_string().green().bold(),
        report.failed.to_string().red()
    );

    if report.failed > 0 {
        anyhow::bail!("{} expired links could not be removed", report.failed);
    }

    Ok(())
}

async fn check(service: &LinkService) -> Result<()> {
    let store = service.store();

    println!(
        "{}",
        format!("🔍 Checking {} store...", store.backend_name()).bright_blue()
    );

    if !store.health_check().await {
        anyhow::bail!("Store {} is not healthy", store.backend_name());
    }

    println!("{}", "✅ Store OK".green().bold());
    Ok(())
}

fn format_expiry(link: &LinkInfo) -> ColoredString {
    match link.expires_at {
        None => "never".bright_black(),
        Some(at) if link.is_expired => at.format("%Y-%m-%d %H:%M").to_string().red(),
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string().normal(),
    }
}
