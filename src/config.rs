//! Configuration file handling.
//!
//! Settings come from a `folio-stats.toml` file; every field has a default,
//! so a file only needs to name what it changes. Command-line flags are
//! applied on top by the binary.

use crate::display::StatKey;
use crate::error::ConfigError;
use crate::github::DEFAULT_API_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "folio-stats.toml";

/// About a century.
pub const MAX_COMMIT_WINDOW_DAYS: u32 = 36_500;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Account whose stats are shown.
    #[serde(default)]
    pub username: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding an optional API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            api_url: default_api_url(),
            token_env: default_token_env(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Request caps per cycle. One cycle costs at most
/// `2 + commit_repos + language_repos` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_page_size")]
    pub repo_page_size: u32,

    #[serde(default = "default_commit_repos")]
    pub commit_repos: usize,

    #[serde(default = "default_page_size")]
    pub commit_page_size: u32,

    #[serde(default = "default_commit_window_days")]
    pub commit_window_days: u32,

    #[serde(default = "default_language_repos")]
    pub language_repos: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            repo_page_size: default_page_size(),
            commit_repos: default_commit_repos(),
            commit_page_size: default_page_size(),
            commit_window_days: default_commit_window_days(),
            language_repos: default_language_repos(),
        }
    }
}

fn default_page_size() -> u32 {
    100
}

fn default_commit_repos() -> usize {
    10
}

fn default_commit_window_days() -> u32 {
    365
}

fn default_language_repos() -> usize {
    20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_seconds: default_refresh_seconds(),
        }
    }
}

fn default_refresh_seconds() -> u64 {
    5 * 60
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// HTML page whose `data-stat` elements are rewritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PathBuf>,

    /// Directory for the dark/light SVG stats card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_dir: Option<PathBuf>,

    #[serde(default)]
    pub slots: SlotBindings,
}

impl DisplayConfig {
    pub fn has_surface(&self) -> bool {
        self.page.is_some() || self.svg_dir.is_some()
    }
}

/// Logical stat name to the `data-stat` target it is written into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBindings {
    #[serde(default = "default_repos_target")]
    pub public_repos: String,

    #[serde(default = "default_commits_target")]
    pub total_commits: String,

    #[serde(default = "default_languages_target")]
    pub languages: String,
}

impl SlotBindings {
    pub fn target(&self, key: StatKey) -> &str {
        match key {
            StatKey::PublicRepos => &self.public_repos,
            StatKey::TotalCommits => &self.total_commits,
            StatKey::Languages => &self.languages,
        }
    }
}

impl Default for SlotBindings {
    fn default() -> Self {
        Self {
            public_repos: default_repos_target(),
            total_commits: default_commits_target(),
            languages: default_languages_target(),
        }
    }
}

fn default_repos_target() -> String {
    "projects".to_string()
}

fn default_commits_target() -> String {
    "commits".to_string()
}

fn default_languages_target() -> String {
    "languages".to_string()
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `explicit` if given, otherwise `folio-stats.toml` in the current
    /// directory if it exists, otherwise the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            tracing::debug!("Loading {}", fallback.display());
            return Self::load(fallback);
        }
        Ok(Self::default())
    }

    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.username.trim().is_empty() {
            return invalid("github.username must be set");
        }
        if self.github.timeout_seconds == 0 {
            return invalid("github.timeout_seconds must be greater than 0");
        }
        if self.schedule.refresh_seconds == 0 {
            return invalid("schedule.refresh_seconds must be greater than 0");
        }
        let window = self.limits.commit_window_days;
        if !(1..=MAX_COMMIT_WINDOW_DAYS).contains(&window) {
            return invalid(&format!(
                "limits.commit_window_days must be between 1 and {MAX_COMMIT_WINDOW_DAYS}, got {window}"
            ));
        }
        for (name, size) in [
            ("limits.repo_page_size", self.limits.repo_page_size),
            ("limits.commit_page_size", self.limits.commit_page_size),
        ] {
            if !(1..=100).contains(&size) {
                return invalid(&format!("{name} must be between 1 and 100, got {size}"));
            }
        }
        let slots = &self.display.slots;
        if StatKey::ALL.iter().any(|k| slots.target(*k).trim().is_empty()) {
            return invalid("display.slots targets must not be empty");
        }
        Ok(())
    }
}

fn invalid(message: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid {
        message: message.to_string(),
    })
}
