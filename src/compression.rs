//! Lossless text compression codecs.
//!
//! This module provides three classical codecs sharing one bit packer and one
//! artifact container:
//! - Huffman coding (bottom-up prefix tree)
//! - Shannon-Fano coding (top-down frequency partition)
//! - LZW (incrementally grown dictionary)
//!
//! # Examples
//!
//! ```rust
//! use textpack::compression::{Compression, HuffmanCodec};
//!
//! let artifact = HuffmanCodec.compress(b"aabbbcc").unwrap();
//! assert_eq!(HuffmanCodec.decompress(&artifact).unwrap(), b"aabbbcc");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for compression algorithms
pub trait Compression {
    /// The algorithm recorded in artifacts this codec produces.
    fn algorithm(&self) -> Algorithm;

    /// Compress the input data into a self-describing artifact
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decode an already parsed artifact
    fn decompress_artifact(&self, artifact: Artifact) -> Result<Vec<u8>>;

    /// Decompress an artifact produced by [`Compression::compress`]
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decompress_artifact(Artifact::deserialize(data)?)
    }
}

/// Identifies a codec, both on the command line and in the artifact header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Huffman,
    ShannonFano,
    Lzw,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Huffman, Algorithm::ShannonFano, Algorithm::Lzw];

    /// Header tag byte.
    pub fn tag(self) -> u8 {
        match self {
            Algorithm::Huffman => 1,
            Algorithm::ShannonFano => 2,
            Algorithm::Lzw => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Algorithm::Huffman),
            2 => Ok(Algorithm::ShannonFano),
            3 => Ok(Algorithm::Lzw),
            other => Err(Error::Format(format!("unknown algorithm tag {other}"))),
        }
    }

    /// Whether artifacts of this algorithm carry a code table.
    pub fn has_table(self) -> bool {
        !matches!(self, Algorithm::Lzw)
    }

    /// A codec for this algorithm, using `lzw` when the algorithm is LZW.
    pub fn codec(self, lzw: LzwConfig) -> Box<dyn Compression> {
        match self {
            Algorithm::Huffman => Box::new(HuffmanCodec),
            Algorithm::ShannonFano => Box::new(ShannonFanoCodec),
            Algorithm::Lzw => Box::new(LzwCodec::new(lzw)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Huffman => "huffman",
            Algorithm::ShannonFano => "shannon-fano",
            Algorithm::Lzw => "lzw",
        })
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "huffman" => Ok(Algorithm::Huffman),
            "shannon-fano" | "shannon_fano" | "shannonfano" => Ok(Algorithm::ShannonFano),
            "lzw" => Ok(Algorithm::Lzw),
            other => Err(Error::InvalidInput(format!(
                "unknown algorithm '{other}', expected huffman, shannon-fano or lzw"
            ))),
        }
    }
}

/// Character codecs work on Unicode scalars, so their input must be UTF-8.
pub(crate) fn text_from_utf8(data: &[u8]) -> Result<&str> {
    std::str::from_utf8(data).map_err(|e| {
        Error::InvalidInput(format!(
            "input is not valid UTF-8 ({e}); use lzw for binary data"
        ))
    })
}

pub mod bits;
pub mod code_table;
pub mod container;
pub mod frequency;
pub mod huffman;
pub mod lzw;
pub mod shannon_fano;

pub use bits::{pack, unpack, Bits, PackedBits};
pub use code_table::CodeTable;
pub use container::Artifact;
pub use frequency::{FrequencyTable, SymbolCount};
pub use huffman::{
    build_frequency_table, build_huffman_tree, huffman_decode, huffman_encode, HuffmanCodec,
    HuffmanNode, HuffmanTree,
};
pub use lzw::{Dictionary, LzwCodec, LzwConfig};
pub use shannon_fano::{shannon_fano_decode, shannon_fano_encode, ShannonFanoCodec};
