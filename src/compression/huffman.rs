//! Huffman coding.
//!
//! The tree is built bottom-up from a min-priority queue and stored as an arena
//! of nodes addressed by index. Equal weights are resolved first-in first-out
//! by an insertion sequence number: leaves enter the queue in first-occurrence
//! order, and each merged node takes the next sequence number. The tree only
//! lives long enough to derive a [`CodeTable`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bitvec::prelude::*;

use super::bits::{self, Bits};
use super::code_table::CodeTable;
use super::container::Artifact;
use super::frequency::FrequencyTable;
use super::{text_from_utf8, Algorithm, Compression, Result};

/// Index of a node inside a [`HuffmanTree`].
pub type NodeId = usize;

/// Represents a node in the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A leaf node owns a symbol and its weight.
    Leaf { symbol: char, weight: usize },
    /// An internal node whose weight is the sum of its two children.
    Internal {
        weight: usize,
        left: NodeId,
        right: NodeId,
    },
}

impl HuffmanNode {
    /// Returns the weight of the node.
    pub fn weight(&self) -> usize {
        match self {
            HuffmanNode::Leaf { weight, .. } => *weight,
            HuffmanNode::Internal { weight, .. } => *weight,
        }
    }
}

/// Priority queue entry. The lowest weight has the highest priority, and among
/// equal weights the earliest inserted wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    weight: usize,
    seq: usize,
    node: NodeId,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A Huffman tree held in a node arena.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: NodeId,
}

impl HuffmanTree {
    /// Builds the tree for a frequency table.
    /// Returns `None` if the frequency table is empty.
    pub fn build(freq_table: &FrequencyTable<char>) -> Option<Self> {
        let mut nodes = Vec::with_capacity(freq_table.len().saturating_mul(2));
        let mut heap = BinaryHeap::with_capacity(freq_table.len());
        let mut seq = 0;

        for entry in freq_table.iter() {
            nodes.push(HuffmanNode::Leaf {
                symbol: entry.symbol,
                weight: entry.count,
            });
            heap.push(QueueEntry {
                weight: entry.count,
                seq,
                node: nodes.len() - 1,
            });
            seq += 1;
        }

        while heap.len() > 1 {
            let (Some(left), Some(right)) = (heap.pop(), heap.pop()) else {
                break;
            };
            let weight = left.weight + right.weight;
            nodes.push(HuffmanNode::Internal {
                weight,
                left: left.node,
                right: right.node,
            });
            heap.push(QueueEntry {
                weight,
                seq,
                node: nodes.len() - 1,
            });
            seq += 1;
        }

        let root = heap.pop()?.node;
        log::debug!(
            "huffman tree: {} leaves, {} nodes, root weight {}",
            freq_table.len(),
            nodes.len(),
            nodes[root].weight()
        );
        Some(HuffmanTree { nodes, root })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &HuffmanNode {
        &self.nodes[id]
    }

    /// Number of nodes in the arena, leaves and internal nodes together.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Derives the code table by walking the tree with an explicit stack,
    /// appending `0` for a left edge and `1` for a right edge.
    ///
    /// If the tree consists of a single leaf (one distinct symbol), that symbol
    /// gets the code `0`.
    pub fn code_table(&self) -> CodeTable {
        let mut table = CodeTable::new();
        let mut stack: Vec<(NodeId, Bits)> = vec![(self.root, Bits::new())];

        while let Some((id, prefix)) = stack.pop() {
            match &self.nodes[id] {
                HuffmanNode::Leaf { symbol, .. } => {
                    let code = if prefix.is_empty() {
                        bitvec![u8, Msb0; 0]
                    } else {
                        prefix
                    };
                    table.insert(*symbol, code);
                }
                HuffmanNode::Internal { left, right, .. } => {
                    let mut right_prefix = prefix.clone();
                    right_prefix.push(true);
                    stack.push((*right, right_prefix));
                    let mut left_prefix = prefix;
                    left_prefix.push(false);
                    stack.push((*left, left_prefix));
                }
            }
        }
        table
    }
}

/// Builds a frequency table over the characters of `input`.
pub fn build_frequency_table(input: &str) -> FrequencyTable<char> {
    FrequencyTable::analyze(input.chars())
}

/// Builds the Huffman tree given a frequency table.
pub fn build_huffman_tree(freq_table: &FrequencyTable<char>) -> Option<HuffmanTree> {
    HuffmanTree::build(freq_table)
}

/// Convenience function: builds the tree from `input`, derives the code table,
/// and returns (encoded bits, code table).
///
/// Empty input yields empty bits and an empty table.
pub fn huffman_encode(input: &str) -> Result<(Bits, CodeTable)> {
    let freq_table = build_frequency_table(input);
    let Some(tree) = build_huffman_tree(&freq_table) else {
        return Ok((Bits::new(), CodeTable::new()));
    };
    let code_table = tree.code_table();
    let encoded = code_table.encode(input)?;
    log::debug!(
        "huffman: {} symbols -> {} bits, longest code {}",
        freq_table.total(),
        encoded.len(),
        code_table.max_code_len()
    );
    Ok((encoded, code_table))
}

/// Convenience function: decodes bits with the code table produced by [`huffman_encode`].
pub fn huffman_decode(encoded: &BitSlice<u8, Msb0>, code_table: &CodeTable) -> String {
    code_table.decode(encoded)
}

/// Huffman codec producing self-describing artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct HuffmanCodec;

impl Compression for HuffmanCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Huffman
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let text = text_from_utf8(data)?;
        let (encoded, table) = huffman_encode(text)?;
        let packed = bits::pack(&encoded);
        Artifact::with_table(Algorithm::Huffman, table, packed).serialize()
    }

    fn decompress_artifact(&self, artifact: Artifact) -> Result<Vec<u8>> {
        let (table, encoded) = artifact
            .expect_algorithm(Algorithm::Huffman)?
            .into_table_and_bits()?;
        Ok(huffman_decode(&encoded, &table).into_bytes())
    }
}
