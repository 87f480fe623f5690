//! Writing stats into display slots.
//!
//! A surface exposes its numeric slots by logical [`StatKey`]. The free
//! functions here carry the update rules so every surface behaves the same:
//! a missing slot is skipped, and nothing in this module ever returns an error.

mod html;
mod memory;
mod svg;

pub use html::HtmlPage;
pub use memory::MemoryDisplay;
pub use svg::{SvgCard, Theme};

use crate::config::DisplayConfig;
use crate::error::DisplayError;
use crate::stats::StatsResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const PLACEHOLDER_TEXT: &str = "...";
pub const LOADING_OPACITY: f32 = 0.5;
pub const FADE_TRANSITION: &str = "opacity 0.5s ease";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    PublicRepos,
    TotalCommits,
    Languages,
}

impl StatKey {
    /// Slot order on the page.
    pub const ALL: [StatKey; 3] = [
        StatKey::PublicRepos,
        StatKey::TotalCommits,
        StatKey::Languages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::PublicRepos => "public_repos",
            StatKey::TotalCommits => "total_commits",
            StatKey::Languages => "languages",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKey::PublicRepos => "Projects",
            StatKey::TotalCommits => "Commits",
            StatKey::Languages => "Languages",
        }
    }
}

/// Visual state of one numeric element.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub text: String,
    pub opacity: f32,
    pub transition: Option<String>,
}

impl Slot {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            opacity: 1.0,
            transition: None,
        }
    }

    pub fn show_placeholder(&mut self) {
        self.text = PLACEHOLDER_TEXT.to_string();
        self.opacity = LOADING_OPACITY;
    }

    pub fn fade_in(&mut self) {
        self.opacity = 1.0;
        self.transition = Some(FADE_TRANSITION.to_string());
    }

    /// Whether the slot still has its initial look.
    pub fn is_unstyled(&self) -> bool {
        self.opacity == 1.0 && self.transition.is_none()
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::new("")
    }
}

pub trait StatsDisplay: Send {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// The slot bound to `key`, if this surface has one.
    fn slot_mut(&mut self, key: StatKey) -> Option<&mut Slot>;

    /// Every numeric slot on the surface, bound or not.
    fn slots_mut(&mut self) -> Vec<&mut Slot>;

    /// Figures beyond the three slots; most surfaces ignore them.
    fn set_extras(&mut self, _stats: &StatsResult) {}

    fn flush(&mut self) -> Result<(), DisplayError>;
}

/// Put every numeric slot into its loading state.
pub fn init_placeholders(display: &mut dyn StatsDisplay) {
    for slot in display.slots_mut() {
        slot.show_placeholder();
    }
    flush_quietly(display);
}

/// Write `stats` into the surface. Missing slots are skipped and a failed
/// flush is only logged.
pub fn render(display: &mut dyn StatsDisplay, stats: &StatsResult) {
    let surface = display.name().to_string();
    for key in StatKey::ALL {
        match display.slot_mut(key) {
            Some(slot) => slot.text = stats.value(key).to_string(),
            None => debug!("{surface}: no slot for {}, skipping", key.as_str()),
        }
    }

    for slot in display.slots_mut() {
        slot.fade_in();
    }
    display.set_extras(stats);
    flush_quietly(display);
}

fn flush_quietly(surface: &mut dyn StatsDisplay) {
    if let Err(e) = surface.flush() {
        warn!("{}: failed to update display: {e}", surface.name());
    }
}

/// Build the file-backed surfaces named in `config`.
pub fn surfaces_from_config(
    config: &DisplayConfig,
    username: &str,
) -> Result<Vec<Box<dyn StatsDisplay>>, DisplayError> {
    let mut surfaces: Vec<Box<dyn StatsDisplay>> = Vec::new();
    if let Some(page) = &config.page {
        surfaces.push(Box::new(HtmlPage::open(page, &config.slots)?));
    }
    if let Some(dir) = &config.svg_dir {
        surfaces.push(Box::new(SvgCard::new(dir, username)));
    }
    Ok(surfaces)
}
