//! Command-line arguments. Every flag overrides the matching config value.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Keep a portfolio page's GitHub stats (projects, commits, languages) fresh.
///
/// Examples:
///   folio-stats --username octocat --page site/index.html --once
///   folio-stats --username octocat --svg-dir assets
///   folio-stats --username octocat --dry-run --once
///   folio-stats --init-config
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for folio-stats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitHub account whose stats are shown
    #[arg(short, long, env = "FOLIO_STATS_USERNAME")]
    pub username: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, value_name = "URL", env = "FOLIO_STATS_API_URL")]
    pub api_url: Option<String>,

    /// HTML page whose data-stat elements are rewritten
    #[arg(short, long, value_name = "FILE")]
    pub page: Option<PathBuf>,

    /// Directory for dark_mode.svg and light_mode.svg
    #[arg(long, value_name = "DIR")]
    pub svg_dir: Option<PathBuf>,

    /// Seconds between refreshes
    #[arg(long, value_name = "SECONDS")]
    pub refresh_seconds: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Print the stats instead of writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a default folio-stats.toml and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    pub fn apply(&self, config: &mut Config) {
        if let Some(username) = &self.username {
            config.github.username = username.clone();
        }
        if let Some(api_url) = &self.api_url {
            config.github.api_url = api_url.clone();
        }
        if let Some(page) = &self.page {
            config.display.page = Some(page.clone());
        }
        if let Some(dir) = &self.svg_dir {
            config.display.svg_dir = Some(dir.clone());
        }
        if let Some(seconds) = self.refresh_seconds {
            config.schedule.refresh_seconds = seconds;
        }
    }
}
