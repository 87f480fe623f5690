use super::{Slot, StatKey, StatsDisplay};
use crate::config::SlotBindings;
use crate::error::DisplayError;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// An opening tag carrying `data-stat="..."`, followed by its text content.
static STAT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<[A-Za-z][A-Za-z0-9-]*\b[^>]*?\sdata-stat\s*=\s*"([^"]*)"[^>]*>)([^<]*)"#)
        .expect("valid stat element pattern")
});

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+style\s*=\s*"([^"]*)""#).expect("valid style pattern")
});

struct PageSlot {
    target: String,
    original: String,
    slot: Slot,
}

/// A static HTML page whose `data-stat` elements are the numeric slots.
/// Only those elements' text and `style` attribute are ever rewritten.
pub struct HtmlPage {
    path: PathBuf,
    source: String,
    bindings: BTreeMap<StatKey, String>,
    slots: Vec<PageSlot>,
}

impl HtmlPage {
    pub fn open(path: impl AsRef<Path>, bindings: &SlotBindings) -> Result<Self, DisplayError> {
        let path = path.as_ref().to_path_buf();
        let source = fs::read_to_string(&path).map_err(|source| DisplayError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(Self::from_source(path, source, bindings))
    }

    pub fn from_source(path: PathBuf, source: String, bindings: &SlotBindings) -> Self {
        let slots = parse_slots(&source);
        debug!("{}: found {} stat elements", path.display(), slots.len());

        let bindings = StatKey::ALL
            .iter()
            .map(|k| (*k, bindings.target(*k).to_string()))
            .collect();

        Self {
            path,
            source,
            bindings,
            slots,
        }
    }

    /// The page with the current slot state applied.
    pub fn render_source(&self) -> String {
        let mut index = 0;
        STAT_ELEMENT
            .replace_all(&self.source, |caps: &Captures| {
                let current = self.slots.get(index);
                index += 1;
                match current {
                    Some(page_slot) => rewrite_element(caps, page_slot),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Pick up edits made to the file since it was last read. Elements that
    /// are still present keep their slot state, matched by target in page
    /// order; new elements start out as they are in the file.
    fn reload(&mut self) -> Result<(), DisplayError> {
        let source = fs::read_to_string(&self.path).map_err(|source| DisplayError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut previous = std::mem::take(&mut self.slots);
        let mut fresh = parse_slots(&source);
        for page_slot in &mut fresh {
            if let Some(pos) = previous.iter().position(|p| p.target == page_slot.target) {
                page_slot.slot = previous.remove(pos).slot;
            }
        }
        if !previous.is_empty() {
            debug!(
                "{}: {} stat elements no longer on the page",
                self.path.display(),
                previous.len()
            );
        }

        self.slots = fresh;
        self.source = source;
        Ok(())
    }
}

fn parse_slots(source: &str) -> Vec<PageSlot> {
    STAT_ELEMENT
        .captures_iter(source)
        .map(|caps| {
            let original = caps[3].trim().to_string();
            PageSlot {
                target: caps[2].to_string(),
                slot: Slot::new(original.clone()),
                original,
            }
        })
        .collect()
}

fn rewrite_element(caps: &Captures, page_slot: &PageSlot) -> String {
    let slot = &page_slot.slot;
    if slot.is_unstyled() && slot.text == page_slot.original {
        return caps[0].to_string();
    }

    let open = if slot.is_unstyled() {
        caps[1].to_string()
    } else {
        with_style(&caps[1], slot)
    };
    format!("{open}{}", escape_text(&slot.text))
}

/// Replace the opacity/transition declarations of `open`'s style attribute,
/// keeping any other declarations.
fn with_style(open: &str, slot: &Slot) -> String {
    let mut declarations: Vec<String> = STYLE_ATTR
        .captures(open)
        .map(|caps| {
            caps[1]
                .split(';')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .filter(|d| {
                    let property = d.split(':').next().unwrap_or("").trim();
                    property != "opacity" && property != "transition"
                })
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    declarations.push(format!("opacity: {}", slot.opacity));
    if let Some(transition) = &slot.transition {
        declarations.push(format!("transition: {transition}"));
    }

    let stripped = STYLE_ATTR.replace(open, "");
    let head = stripped.strip_suffix('>').unwrap_or(&*stripped);
    format!("{head} style=\"{}\">", declarations.join("; "))
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl StatsDisplay for HtmlPage {
    fn name(&self) -> &str {
        "html"
    }

    fn slot_mut(&mut self, key: StatKey) -> Option<&mut Slot> {
        let target = self.bindings.get(&key)?;
        self.slots
            .iter_mut()
            .find(|s| &s.target == target)
            .map(|s| &mut s.slot)
    }

    fn slots_mut(&mut self) -> Vec<&mut Slot> {
        self.slots.iter_mut().map(|s| &mut s.slot).collect()
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.reload()?;
        fs::write(&self.path, self.render_source()).map_err(|source| DisplayError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
