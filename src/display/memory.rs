use super::{PLACEHOLDER_TEXT, Slot, StatKey, StatsDisplay};
use crate::error::DisplayError;
use std::collections::BTreeMap;

/// Slots held in memory. With `echo` set, each flush that carries real
/// values prints them to stdout.
#[derive(Debug, Default, Clone)]
pub struct MemoryDisplay {
    slots: BTreeMap<StatKey, Slot>,
    echo: bool,
    flushes: usize,
}

impl MemoryDisplay {
    pub fn with_slots(keys: impl IntoIterator<Item = StatKey>) -> Self {
        Self {
            slots: keys.into_iter().map(|k| (k, Slot::default())).collect(),
            ..Self::default()
        }
    }

    pub fn stdout() -> Self {
        Self {
            echo: true,
            ..Self::with_slots(StatKey::ALL)
        }
    }

    pub fn slot(&self, key: StatKey) -> Option<&Slot> {
        self.slots.get(&key)
    }

    pub fn text(&self, key: StatKey) -> Option<&str> {
        self.slots.get(&key).map(|s| s.text.as_str())
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// The lines an echoing flush prints, or `None` while any slot is still
    /// loading.
    fn echo_block(&self) -> Option<String> {
        if self.slots.values().any(|s| s.text == PLACEHOLDER_TEXT) {
            return None;
        }
        let lines: Vec<String> = self
            .slots
            .iter()
            .map(|(key, slot)| format!("{:<10} {}", key.label(), slot.text))
            .collect();
        Some(lines.join("\n"))
    }
}

impl StatsDisplay for MemoryDisplay {
    fn name(&self) -> &str {
        "memory"
    }

    fn slot_mut(&mut self, key: StatKey) -> Option<&mut Slot> {
        self.slots.get_mut(&key)
    }

    fn slots_mut(&mut self) -> Vec<&mut Slot> {
        self.slots.values_mut().collect()
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flushes += 1;
        if self.echo {
            if let Some(block) = self.echo_block() {
                println!("{block}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{init_placeholders, render};
    use crate::stats::StatsResult;

    #[test]
    fn loading_state_is_not_echoed() {
        let mut display = MemoryDisplay::stdout();
        init_placeholders(&mut display);

        assert_eq!(display.flushes(), 1);
        assert_eq!(display.echo_block(), None);
    }

    #[test]
    fn rendered_values_are_echoed_in_slot_order() {
        let mut display = MemoryDisplay::stdout();
        init_placeholders(&mut display);
        render(&mut display, &StatsResult::FALLBACK);

        assert_eq!(
            display.echo_block().as_deref(),
            Some("Projects   3\nCommits    30\nLanguages  10")
        );
    }
}
