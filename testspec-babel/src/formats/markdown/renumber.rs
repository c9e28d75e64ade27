//! Sequential numbering of ordered lists
//!
//! Authors write every ordered list entry as `1.` and the transcoder assigns the real
//! numbers. One counter is kept per nesting depth (depth 0 is the top-level steps list);
//! climbing back out of a nested list restarts the counters of the depths that were left.

/// Per-depth counters for ordered list entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRenumberer {
    counters: Vec<usize>,
}

impl ListRenumberer {
    /// Tracks `depths` nesting depths, all starting at 1.
    pub fn new(depths: usize) -> Self {
        ListRenumberer {
            counters: vec![1; depths.max(1)],
        }
    }

    /// Restarts every depth at 1.
    pub fn reset(&mut self) {
        self.counters.iter_mut().for_each(|counter| *counter = 1);
    }

    /// Restarts the depths in `(current, previous]` when moving out of a nested list.
    pub fn renumber(&mut self, current: usize, previous: usize) {
        for (depth, counter) in self.counters.iter_mut().enumerate() {
            if current < depth && depth <= previous {
                *counter = 1;
            }
        }
    }

    /// Replaces the first `1` in `line` with the next number for `depth`.
    ///
    /// Depths beyond the tracked range leave the line untouched.
    pub fn convert(&mut self, line: &str, depth: usize) -> String {
        match self.counters.get_mut(depth) {
            Some(counter) => {
                let converted = line.replacen('1', &counter.to_string(), 1);
                *counter += 1;
                converted
            }
            None => line.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_convert_numbers_sequentially() {
        let mut numbers = ListRenumberer::new(4);
        assert_eq!(numbers.convert("1. open", 0), "1. open");
        assert_eq!(numbers.convert("1. close", 0), "2. close");
        assert_eq!(numbers.convert("    1. nested", 1), "    1. nested");
        assert_eq!(numbers.convert("    1. nested", 1), "    2. nested");
    }

    #[test]
    fn test_convert_replaces_only_the_first_one() {
        let mut numbers = ListRenumberer::new(1);
        numbers.convert("1. a", 0);
        assert_eq!(numbers.convert("1. press 1", 0), "2. press 1");
    }

    #[test]
    fn test_convert_without_placeholder_still_advances() {
        let mut numbers = ListRenumberer::new(1);
        assert_eq!(numbers.convert("3. third", 0), "3. third");
        assert_eq!(numbers.convert("1. fourth", 0), "2. fourth");
    }

    #[test]
    fn test_renumber_restarts_left_depths() {
        let mut numbers = ListRenumberer::new(4);
        numbers.convert("1. a", 0);
        numbers.convert("    1. b", 1);
        numbers.convert("        1. c", 2);

        numbers.renumber(0, 2);
        assert_eq!(numbers.convert("1. d", 0), "2. d");
        assert_eq!(numbers.convert("    1. e", 1), "    1. e");
        assert_eq!(numbers.convert("        1. f", 2), "        1. f");
    }

    #[test]
    fn test_renumber_going_deeper_is_a_no_op() {
        let mut numbers = ListRenumberer::new(4);
        numbers.convert("1. a", 0);
        numbers.renumber(1, 0);
        assert_eq!(numbers.convert("1. b", 0), "2. b");
    }

    #[test]
    fn test_reset() {
        let mut numbers = ListRenumberer::new(2);
        numbers.convert("1. a", 0);
        numbers.convert("    1. b", 1);
        numbers.reset();
        assert_eq!(numbers.convert("1. c", 0), "1. c");
        assert_eq!(numbers.convert("    1. d", 1), "    1. d");
    }

    #[test]
    fn test_out_of_range_depth_is_ignored() {
        let mut numbers = ListRenumberer::new(1);
        assert_eq!(numbers.convert("1. a", 3), "1. a");
        numbers.renumber(0, 9);
    }

    proptest! {
        #[test]
        fn prop_placeholder_lists_count_up(len in 1usize..40) {
            let mut numbers = ListRenumberer::new(1);
            for expected in 1..=len {
                prop_assert_eq!(numbers.convert("1. x", 0), format!("{expected}. x"));
            }
        }
    }
}
