use anyhow::{Context, Result, bail};
use clap::Parser;
use folio_stats::cli::Args;
use folio_stats::config::{Config, DEFAULT_CONFIG_FILE};
use folio_stats::display::{self, MemoryDisplay, StatsDisplay};
use folio_stats::{Aggregator, GithubClient, Scheduler, logging};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        return write_default_config();
    }

    logging::init_cli_logger(args.verbose);
    debug!("Arguments: {args:?}");

    let mut config = Config::discover(args.config.as_deref()).context("Failed to load config")?;
    args.apply(&mut config);
    config.validate()?;
    if !args.dry_run && !config.display.has_surface() {
        bail!("Nothing to update: set --page and/or --svg-dir (or use --dry-run)");
    }

    let token = std::env::var(&config.github.token_env)
        .ok()
        .filter(|t| !t.is_empty());
    if token.is_some() {
        debug!("Using API token from {}", config.github.token_env);
    }
    let client = GithubClient::new(
        config.github.api_url.clone(),
        token,
        Duration::from_secs(config.github.timeout_seconds),
    )?;

    let surfaces: Vec<Box<dyn StatsDisplay>> = if args.dry_run {
        vec![Box::new(MemoryDisplay::stdout())]
    } else {
        display::surfaces_from_config(&config.display, &config.github.username)?
    };

    let scheduler = Scheduler::new(
        Aggregator::new(client, config.limits),
        config.github.username.as_str(),
        surfaces,
        Duration::from_secs(config.schedule.refresh_seconds),
    );

    if args.once {
        scheduler.initialize().await;
        let stats = scheduler.run_once().await;
        info!(
            "Updated: {} projects, {} commits, {} languages",
            stats.public_repos, stats.total_commits, stats.languages
        );
        return Ok(());
    }

    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}

fn write_default_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        bail!("{DEFAULT_CONFIG_FILE} already exists. Remove it first or edit it manually.");
    }

    let content = Config::default_toml()?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {DEFAULT_CONFIG_FILE}"))?;

    println!("Created {DEFAULT_CONFIG_FILE}. Set github.username and a display target to get started.");
    Ok(())
}
