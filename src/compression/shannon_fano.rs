//! Shannon-Fano coding.
//!
//! Symbols are ranked by descending frequency (ties by first occurrence) and
//! the ranked list is split top-down into two groups of roughly equal weight.
//! The split is the greedy one: scanning stops as soon as the imbalance stops
//! shrinking, and ties keep the earlier split. Recursion is replaced by an
//! explicit work stack of (sub-range, prefix) pairs.

use std::ops::Range;

use bitvec::prelude::*;

use super::bits::{self, Bits};
use super::code_table::CodeTable;
use super::container::Artifact;
use super::frequency::{FrequencyTable, SymbolCount};
use super::{text_from_utf8, Algorithm, Compression, Result};

/// Ranks the characters of `input` for partitioning.
pub fn ranked_frequencies(input: &str) -> Vec<SymbolCount<char>> {
    FrequencyTable::analyze(input.chars()).ranked()
}

/// Returns the number of leading entries that go into the first group.
///
/// For a list of fewer than two entries this is 1.
pub fn split_point(ranked: &[SymbolCount<char>]) -> usize {
    let total: usize = ranked.iter().map(|entry| entry.count).sum();
    let mut running = 0usize;
    let mut best_index = 0;
    let mut min_difference = usize::MAX;

    for (i, entry) in ranked
        .iter()
        .enumerate()
        .take(ranked.len().saturating_sub(1))
    {
        running += entry.count;
        let difference = running.abs_diff(total - running);
        if difference < min_difference {
            min_difference = difference;
            best_index = i;
        } else {
            break;
        }
    }
    best_index + 1
}

/// Assigns codes to a ranked list, every code starting with `prefix`.
///
/// A list holding a single symbol gets `prefix` itself, or `0` when `prefix`
/// is empty.
pub fn build_codes(ranked: &[SymbolCount<char>], prefix: &BitSlice<u8, Msb0>) -> CodeTable {
    let mut table = CodeTable::new();
    if ranked.is_empty() {
        return table;
    }

    let mut stack: Vec<(Range<usize>, Bits)> = vec![(0..ranked.len(), prefix.to_bitvec())];
    while let Some((range, code)) = stack.pop() {
        let group = &ranked[range.clone()];
        if let [only] = group {
            let code = if code.is_empty() {
                bitvec![u8, Msb0; 0]
            } else {
                code
            };
            table.insert(only.symbol, code);
            continue;
        }

        let split = range.start + split_point(group);
        log::trace!("shannon-fano: split {:?} at {}", range, split);

        let mut right = code.clone();
        right.push(true);
        stack.push((split..range.end, right));
        let mut left = code;
        left.push(false);
        stack.push((range.start..split, left));
    }
    table
}

/// Convenience function: ranks, partitions and encodes `input`, returning
/// (encoded bits, code table).
///
/// Empty input yields empty bits and an empty table.
pub fn shannon_fano_encode(input: &str) -> Result<(Bits, CodeTable)> {
    let ranked = ranked_frequencies(input);
    let code_table = build_codes(&ranked, &Bits::new());
    let encoded = code_table.encode(input)?;
    log::debug!(
        "shannon-fano: {} distinct symbols -> {} bits, longest code {}",
        ranked.len(),
        encoded.len(),
        code_table.max_code_len()
    );
    Ok((encoded, code_table))
}

/// Convenience function: decodes bits with a table from [`shannon_fano_encode`].
pub fn shannon_fano_decode(encoded: &BitSlice<u8, Msb0>, code_table: &CodeTable) -> String {
    code_table.decode(encoded)
}

/// Shannon-Fano codec producing self-describing artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShannonFanoCodec;

impl Compression for ShannonFanoCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ShannonFano
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let text = text_from_utf8(data)?;
        let (encoded, table) = shannon_fano_encode(text)?;
        let packed = bits::pack(&encoded);
        Artifact::with_table(Algorithm::ShannonFano, table, packed).serialize()
    }

    fn decompress_artifact(&self, artifact: Artifact) -> Result<Vec<u8>> {
        let (table, encoded) = artifact
            .expect_algorithm(Algorithm::ShannonFano)?
            .into_table_and_bits()?;
        Ok(shannon_fano_decode(&encoded, &table).into_bytes())
    }
}
