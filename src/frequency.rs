use crate::batch::Batch;
use ahash::{HashMap, HashMapExt};
use std::cmp::Ordering;

/// Exact occurrence counts for every string written during one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<Box<str>, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable { counts: HashMap::new() }
    }

    pub fn add(&mut self, value: &str, count: u64) {
        if count == 0 {
            return;
        }
        match self.counts.get_mut(value) {
            Some(total) => *total += count,
            None => {
                self.counts.insert(value.into(), count);
            }
        }
    }

    pub fn merge_batch(&mut self, batch: &Batch) {
        for (value, repeat) in batch.groups() {
            self.add(value, repeat as u64);
        }
    }

    pub fn merge(&mut self, other: FrequencyTable) {
        for (value, count) in other.counts {
            *self.counts.entry(value).or_default() += count;
        }
    }

    pub fn get(&self, value: &str) -> Option<u64> {
        self.counts.get(value).copied()
    }

    /// Number of distinct strings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(value, count)| (&**value, *count))
    }

    /// The `n` most frequent entries, highest count first. Equal counts are ordered by value.
    pub fn top_n(&self, n: usize) -> Vec<(&str, u64)> {
        if n == 0 {
            return Vec::new();
        }
        let mut entries = self.iter().collect::<Vec<_>>();
        if n < entries.len() {
            entries.select_nth_unstable_by(n - 1, rank);
            entries.truncate(n);
        }
        entries.sort_unstable_by(rank);
        entries
    }
}

/// Descending count, then ascending value.
pub fn rank(left: &(&str, u64), right: &(&str, u64)) -> Ordering {
    right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0))
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut table = FrequencyTable::new();
        for value in iter {
            table.add(value.as_ref(), 1);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_batch_is_additive() {
        let mut table = FrequencyTable::new();
        table.merge_batch(&Batch::from_groups([("a", 3), ("b", 2), ("a", 1)]));
        table.merge_batch(&Batch::from_groups([("b", 5), ("c", 1)]));
        assert_eq!(table.get("a"), Some(4));
        assert_eq!(table.get("b"), Some(7));
        assert_eq!(table.get("c"), Some(1));
        assert_eq!(table.get("d"), None);
        assert_eq!(table.len(), 3);
        assert_eq!(table.total(), 12);
    }

    #[test]
    fn zero_counts_are_not_recorded() {
        let mut table = FrequencyTable::new();
        table.add("a", 0);
        assert!(table.is_empty());
    }

    #[test]
    fn top_n_orders_by_count_then_value() {
        let table = ["b", "a", "c", "c", "d", "d", "e", "e", "e"]
            .into_iter()
            .collect::<FrequencyTable>();
        assert_eq!(
            table.top_n(4),
            vec![("e", 3), ("c", 2), ("d", 2), ("a", 1)]
        );
        assert_eq!(table.top_n(1), vec![("e", 3)]);
    }

    #[test]
    fn top_n_edges() {
        let table = ["x", "y", "y"].into_iter().collect::<FrequencyTable>();
        assert!(table.top_n(0).is_empty());
        assert_eq!(table.top_n(10), vec![("y", 2), ("x", 1)]);
        assert!(FrequencyTable::new().top_n(5).is_empty());
    }

    #[test]
    fn top_n_matches_full_sort() {
        let mut table = FrequencyTable::new();
        for i in 0..500u64 {
            table.add(&format!("v{i}"), (i * 7919) % 37);
        }
        let mut full = table.iter().collect::<Vec<_>>();
        full.sort_by(rank);
        for n in [1, 10, 36, 100, 499, 500, 1000] {
            let expected = full.iter().take(n).copied().collect::<Vec<_>>();
            assert_eq!(table.top_n(n), expected, "n = {n}");
        }
    }

    #[test]
    fn merge_tables() {
        let mut left = ["a", "b"].into_iter().collect::<FrequencyTable>();
        let right = ["b", "c"].into_iter().collect::<FrequencyTable>();
        left.merge(right);
        assert_eq!(left.get("b"), Some(2));
        assert_eq!(left.len(), 3);
    }
}
