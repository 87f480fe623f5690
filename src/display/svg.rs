use super::{Slot, StatKey, StatsDisplay};
use crate::error::DisplayError;
use crate::stats::StatsResult;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const START_Y: i32 = 30;
const LINE_HEIGHT: i32 = 20;
const LEFT_PADDING: f32 = 15.0;
const RIGHT_PADDING: f32 = 30.0;
const BOTTOM_PADDING: f32 = 20.0;
const CHAR_WIDTH: f32 = 9.6;
const MIN_COL_CHARS: usize = 36;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Dark, Theme::Light];

    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#161b22",
                text: "#c9d1d9",
                key: "#ffa657",
                value: "#a5d6ff",
                cc: "#616e7f",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#24292f",
                key: "#d73a49",
                value: "#0366d6",
                cc: "#6a737d",
            },
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Theme::Dark => "dark_mode.svg",
            Theme::Light => "light_mode.svg",
        }
    }
}

/// Stats card written as `dark_mode.svg` and `light_mode.svg`, one row per
/// stat plus follower rows once they are known.
pub struct SvgCard {
    dir: PathBuf,
    username: String,
    slots: BTreeMap<StatKey, Slot>,
    followers: Option<u32>,
    following: Option<u32>,
}

enum Line<'a> {
    Header(String),
    Blank,
    Stat {
        key: &'a str,
        value: String,
        slot: Option<&'a Slot>,
    },
}

impl SvgCard {
    pub fn new(dir: impl AsRef<Path>, username: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            username: username.to_string(),
            slots: StatKey::ALL.iter().map(|k| (*k, Slot::default())).collect(),
            followers: None,
            following: None,
        }
    }

    fn lines(&self) -> Vec<Line<'_>> {
        let mut lines = vec![Line::Header(format!("{}@github", self.username))];
        for (key, slot) in &self.slots {
            lines.push(Line::Stat {
                key: key.label(),
                value: slot.text.clone(),
                slot: Some(slot),
            });
        }

        if self.followers.is_some() || self.following.is_some() {
            lines.push(Line::Blank);
            lines.push(Line::Header("- Social".to_string()));
            for (key, count) in [("Followers", self.followers), ("Following", self.following)] {
                if let Some(count) = count {
                    lines.push(Line::Stat {
                        key,
                        value: count.to_string(),
                        slot: None,
                    });
                }
            }
        }
        lines
    }

    pub fn generate_svg(&self, theme: Theme) -> String {
        let colors = theme.colors();
        let lines = self.lines();

        let align_width = lines
            .iter()
            .filter_map(|line| match line {
                Line::Stat { key, value, .. } => Some(key.len() + 2 + value.len()),
                Line::Header(text) => Some(text.len()),
                Line::Blank => None,
            })
            .max()
            .unwrap_or(0)
            .max(MIN_COL_CHARS);

        let mut tspans = String::new();
        for (i, line) in lines.iter().enumerate() {
            let y = START_Y + (i as i32) * LINE_HEIGHT;
            match line {
                Line::Blank => {}
                Line::Header(text) => {
                    tspans.push_str(&format!(
                        "<tspan x=\"{LEFT_PADDING}\" y=\"{y}\">{}</tspan>\n",
                        escape_xml(&build_header_line(text, align_width))
                    ));
                }
                Line::Stat { key, value, slot } => {
                    let (k, dots, v) = build_stat_row(key, value, align_width);
                    tspans.push_str(&format!(
                        r#"<tspan x="{LEFT_PADDING}" y="{y}" class="cc">. </tspan>
<tspan class="key">{}</tspan><tspan class="cc">{}</tspan><tspan class="value"{}>{}</tspan>
"#,
                        escape_xml(&k),
                        escape_xml(&dots),
                        slot.map(value_style).unwrap_or_default(),
                        escape_xml(&v)
                    ));
                }
            }
        }

        let w = LEFT_PADDING + (align_width as f32 + 4.0) * CHAR_WIDTH + RIGHT_PADDING;
        let h = lines.len() as f32 * LINE_HEIGHT as f32 + START_Y as f32 + BOTTOM_PADDING;

        format!(
            r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}px" height="{h}px"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="16px">

<style>
.key   {{ fill: {key}; }}
.value {{ fill: {value}; }}
.cc    {{ fill: {cc}; }}
</style>

<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>

<text fill="{text}">
{tspans}</text>

</svg>
"#,
            key = colors.key,
            value = colors.value,
            cc = colors.cc,
            bg = colors.bg,
            text = colors.text,
        )
    }
}

fn value_style(slot: &Slot) -> String {
    let mut attrs = String::new();
    if slot.opacity != 1.0 {
        attrs.push_str(&format!(" opacity=\"{}\"", slot.opacity));
    }
    if let Some(transition) = &slot.transition {
        attrs.push_str(&format!(" style=\"transition: {transition}\""));
    }
    attrs
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Split a row into key, dot leader and value so the values line up at
/// `align_width`.
pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.len() + value.len();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => ".".repeat(n),
    };

    (key_part, dots, value.to_string())
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.len()) + 2;
    format!("{base}{}", "-".repeat(dash_count))
}

impl StatsDisplay for SvgCard {
    fn name(&self) -> &str {
        "svg"
    }

    fn slot_mut(&mut self, key: StatKey) -> Option<&mut Slot> {
        self.slots.get_mut(&key)
    }

    fn slots_mut(&mut self) -> Vec<&mut Slot> {
        self.slots.values_mut().collect()
    }

    fn set_extras(&mut self, stats: &StatsResult) {
        self.followers = stats.followers;
        self.following = stats.following;
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        fs::create_dir_all(&self.dir).map_err(|source| DisplayError::Write {
            path: self.dir.clone(),
            source,
        })?;
        for theme in Theme::ALL {
            let path = self.dir.join(theme.file_name());
            fs::write(&path, self.generate_svg(theme))
                .map_err(|source| DisplayError::Write { path, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{init_placeholders, render};

    #[test]
    fn stat_row_pads_with_dots() {
        let (k, dots, v) = build_stat_row("Commits", "42", 20);
        assert_eq!(k, "Commits: ");
        assert_eq!(dots, ".........");
        assert_eq!(v, "42");
        assert_eq!(k.len() + dots.len() + v.len(), 20);
    }

    #[test]
    fn stat_row_short_gaps() {
        assert_eq!(build_stat_row("A", "1", 4).1, "");
        assert_eq!(build_stat_row("A", "1", 5).1, " ");
        assert_eq!(build_stat_row("A", "1", 6).1, ". ");
    }

    #[test]
    fn header_fills_width_with_dashes() {
        assert_eq!(build_header_line("alice@github", 15), "alice@github ----");
    }

    #[test]
    fn card_shows_rendered_values_and_followers() {
        let dir = tempfile::tempdir().unwrap();
        let mut card = SvgCard::new(dir.path(), "alice");
        render(
            &mut card,
            &StatsResult {
                public_repos: 2,
                total_commits: 5,
                languages: 2,
                followers: Some(7),
                following: None,
            },
        );

        let svg = card.generate_svg(Theme::Dark);
        assert!(svg.contains("alice@github"));
        assert!(svg.contains("<tspan class=\"key\">Commits: </tspan>"));
        assert!(svg.contains("style=\"transition: opacity 0.5s ease\">5</tspan>"));
        assert!(svg.contains("<tspan class=\"key\">Followers: </tspan>"));
        assert!(!svg.contains("Following"));
        assert!(svg.contains("#161b22"));
    }

    #[test]
    fn placeholder_rows_are_dimmed() {
        let dir = tempfile::tempdir().unwrap();
        let mut card = SvgCard::new(dir.path(), "alice");
        init_placeholders(&mut card);

        let svg = card.generate_svg(Theme::Light);
        assert_eq!(svg.matches("opacity=\"0.5\">...</tspan>").count(), 3);
        assert!(!svg.contains("Followers"));
    }

    #[test]
    fn flush_writes_both_themes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cards");
        let mut card = SvgCard::new(&out, "alice");
        render(&mut card, &StatsResult::FALLBACK);

        let dark = fs::read_to_string(out.join("dark_mode.svg")).unwrap();
        let light = fs::read_to_string(out.join("light_mode.svg")).unwrap();
        assert!(dark.contains("#161b22"));
        assert!(light.contains("#ffffff"));
        assert!(light.contains(">30</tspan>"));
    }
}
