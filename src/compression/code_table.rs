//! Symbol -> bit-string code tables and the prefix-code walk shared by the
//! Huffman and Shannon-Fano codecs.

use std::collections::{BTreeMap, HashMap};

use bitvec::prelude::*;

use super::bits::{to_bit_string, Bits};
use crate::error::{Error, Result};

/// A mapping from each symbol of the alphabet to its code.
///
/// Backed by an ordered map so iteration, and therefore serialization, is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<char, Bits>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `code` to `symbol`, returning the previous code if there was one.
    pub fn insert(&mut self, symbol: char, code: Bits) -> Option<Bits> {
        self.codes.insert(symbol, code)
    }

    pub fn get(&self, symbol: char) -> Option<&Bits> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &Bits)> {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// Length of the longest code, or 0 for an empty table.
    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(|code| code.len()).max().unwrap_or(0)
    }

    /// Returns true when no code is a prefix of another and no code is empty.
    pub fn is_prefix_free(&self) -> bool {
        if self.codes.values().any(|code| code.is_empty()) {
            return false;
        }
        // In lexicographic order a code that prefixes any other also prefixes its successor.
        let mut sorted: Vec<String> = self.codes.values().map(|c| to_bit_string(c)).collect();
        sorted.sort();
        sorted
            .windows(2)
            .all(|pair| !pair[1].starts_with(pair[0].as_str()))
    }

    /// Concatenates the code of every symbol of `text`.
    pub fn encode(&self, text: &str) -> Result<Bits> {
        let mut encoded = Bits::new();
        for ch in text.chars() {
            let code = self.codes.get(&ch).ok_or_else(|| {
                Error::InvalidInput(format!("symbol {ch:?} has no code in the table"))
            })?;
            encoded.extend_from_bitslice(code);
        }
        Ok(encoded)
    }

    /// Walks `bits` one at a time, emitting a symbol whenever the running
    /// prefix equals a code exactly.
    ///
    /// Bits left over after the last complete code are discarded without error.
    pub fn decode(&self, bits: &BitSlice<u8, Msb0>) -> String {
        let inverse: HashMap<&Bits, char> =
            self.codes.iter().map(|(&symbol, code)| (code, symbol)).collect();

        let mut decoded = String::new();
        let mut prefix = Bits::new();
        for bit in bits.iter().by_vals() {
            prefix.push(bit);
            if let Some(&symbol) = inverse.get(&prefix) {
                decoded.push(symbol);
                prefix.clear();
            }
        }

        if !prefix.is_empty() {
            log::warn!(
                "discarding {} trailing bits that match no code",
                prefix.len()
            );
        }
        decoded
    }
}

impl FromIterator<(char, Bits)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (char, Bits)>>(iter: I) -> Self {
        CodeTable {
            codes: iter.into_iter().collect(),
        }
    }
}
