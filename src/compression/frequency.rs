//! Symbol frequency statistics.
//!
//! Counts are kept in first-occurrence order so that every tie-break downstream
//! (Huffman queue insertion, Shannon-Fano ranking) is a function of the input
//! alone and never of hash iteration order.

use std::collections::HashMap;
use std::hash::Hash;

/// One distinct symbol with its count and the position of its first appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolCount<S> {
    pub symbol: S,
    pub count: usize,
    /// Index into the source of the symbol's first occurrence.
    pub first_seen: usize,
}

/// Symbol -> occurrence count, iterable in encounter order.
#[derive(Debug, Clone)]
pub struct FrequencyTable<S> {
    entries: Vec<SymbolCount<S>>,
    index: HashMap<S, usize>,
    total: usize,
}

impl<S: Copy + Eq + Hash> FrequencyTable<S> {
    /// Counts occurrences in one pass over `symbols`.
    pub fn analyze<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let mut entries: Vec<SymbolCount<S>> = Vec::new();
        let mut index = HashMap::new();
        let mut total = 0;

        for (position, symbol) in symbols.into_iter().enumerate() {
            let slot = *index.entry(symbol).or_insert_with(|| {
                entries.push(SymbolCount {
                    symbol,
                    count: 0,
                    first_seen: position,
                });
                entries.len() - 1
            });
            entries[slot].count += 1;
            total += 1;
        }

        log::trace!(
            "frequency table: {} distinct symbols over {} total",
            entries.len(),
            total
        );
        FrequencyTable {
            entries,
            index,
            total,
        }
    }

    /// Occurrence count of `symbol`, if it was seen.
    pub fn get(&self, symbol: &S) -> Option<usize> {
        self.index.get(symbol).map(|&i| self.entries[i].count)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of symbols analyzed.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Entries in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolCount<S>> {
        self.entries.iter()
    }

    /// Entries sorted by count descending, ties broken by first appearance ascending.
    pub fn ranked(&self) -> Vec<SymbolCount<S>> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_table() {
        let freq = FrequencyTable::analyze("aabccc".chars());
        assert_eq!(freq.get(&'a'), Some(2));
        assert_eq!(freq.get(&'b'), Some(1));
        assert_eq!(freq.get(&'c'), Some(3));
        assert_eq!(freq.get(&'z'), None);
        assert_eq!(freq.len(), 3);
        assert_eq!(freq.total(), 6);
    }

    #[test]
    fn test_encounter_order() {
        let freq = FrequencyTable::analyze("banana".chars());
        let order: Vec<(char, usize)> = freq.iter().map(|e| (e.symbol, e.first_seen)).collect();
        assert_eq!(order, vec![('b', 0), ('a', 1), ('n', 2)]);
    }

    #[test]
    fn test_ranked_ties_by_first_occurrence() {
        // 'x' and 'y' both occur twice; 'y' appears first.
        let freq = FrequencyTable::analyze("yxzxyqqq".chars());
        let ranked: Vec<char> = freq.ranked().iter().map(|e| e.symbol).collect();
        assert_eq!(ranked, vec!['q', 'y', 'x', 'z']);
    }

    #[test]
    fn test_empty() {
        let freq = FrequencyTable::<u8>::analyze(Vec::new());
        assert!(freq.is_empty());
        assert_eq!(freq.total(), 0);
        assert!(freq.ranked().is_empty());
    }
}
