//! Per-document counters for viewpoint levels and item numbers.

use super::nodes::ColumnKey;

/// Counters for the six viewpoint levels and the item number, all starting at 1.
///
/// Taking a level value resets every deeper level back to 1. The item number is never
/// reset; it runs through the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCounter {
    levels: [usize; 6],
    number: usize,
}

impl Default for ItemCounter {
    fn default() -> Self {
        ItemCounter {
            levels: [1; 6],
            number: 1,
        }
    }
}

impl ItemCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value for `key` and advances the counter.
    ///
    /// Columns that are not counted yield `None`.
    pub fn take(&mut self, key: ColumnKey) -> Option<usize> {
        match key {
            ColumnKey::Level(level @ 1..=6) => {
                let idx = usize::from(level) - 1;
                let value = self.levels[idx];
                self.levels[idx] += 1;
                for deeper in &mut self.levels[idx + 1..] {
                    *deeper = 1;
                }
                Some(value)
            }
            ColumnKey::Number => {
                let value = self.number;
                self.number += 1;
                Some(value)
            }
            _ => None,
        }
    }
}
