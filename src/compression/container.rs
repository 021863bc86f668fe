//! Self-describing artifact container.
//!
//! # Layout
//!
//! ```text
//! +---------------------+
//! | Magic (4 bytes)     |  "TXPK"
//! +---------------------+
//! | version (1)         |  currently 1
//! +---------------------+
//! | tag (1)             |  1 = Huffman, 2 = Shannon-Fano, 3 = LZW
//! +---------------------+
//! | code table          |  Huffman and Shannon-Fano only:
//! | (variable)          |    u32 entry count, then per entry
//! |                     |    u32 scalar, u32 code length in bits,
//! |                     |    ceil(length / 8) code bytes, MSB first
//! +---------------------+
//! | padding (1)         |  0..=7 trailing zero bits in the payload
//! +---------------------+
//! | payload_len (8)     |  u64
//! +---------------------+
//! | payload             |  packed bits
//! +---------------------+
//! ```
//!
//! All integers are little-endian. Anything that does not parse to exactly
//! this shape is rejected with [`Error::Format`].

use std::collections::HashSet;

use super::bits::{self, Bits, PackedBits};
use super::code_table::CodeTable;
use super::Algorithm;
use crate::error::{Error, Result};

/// Magic number for artifacts: "TXPK"
pub const MAGIC: [u8; 4] = *b"TXPK";

/// Current container version.
pub const VERSION: u8 = 1;

/// Smallest possible table entry: scalar, length, one code byte.
const MIN_ENTRY_SIZE: usize = 4 + 4 + 1;

/// The persisted result of one compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub algorithm: Algorithm,
    /// Present exactly when `algorithm` is a prefix-code algorithm.
    pub table: Option<CodeTable>,
    pub padding: u8,
    pub payload: Vec<u8>,
}

impl Artifact {
    /// An artifact for a prefix-code algorithm.
    pub fn with_table(algorithm: Algorithm, table: CodeTable, packed: PackedBits) -> Self {
        Artifact {
            algorithm,
            table: Some(table),
            padding: packed.padding,
            payload: packed.bytes,
        }
    }

    /// An LZW artifact holding only the packed code stream.
    pub fn code_list(packed: PackedBits) -> Self {
        Artifact {
            algorithm: Algorithm::Lzw,
            table: None,
            padding: packed.padding,
            payload: packed.bytes,
        }
    }

    /// Fails unless the artifact was produced by `algorithm`.
    pub fn expect_algorithm(self, algorithm: Algorithm) -> Result<Self> {
        if self.algorithm != algorithm {
            return Err(Error::Format(format!(
                "artifact was produced by {}, not {}",
                self.algorithm, algorithm
            )));
        }
        Ok(self)
    }

    /// Splits a prefix-code artifact into its table and unpadded payload bits.
    pub fn into_table_and_bits(self) -> Result<(CodeTable, Bits)> {
        let encoded = bits::unpack(&self.payload, self.padding)?;
        let table = self.table.ok_or_else(|| {
            Error::Format(format!("{} artifact has no code table", self.algorithm))
        })?;
        Ok((table, encoded))
    }

    /// Serializes the artifact.
    ///
    /// Fails with [`Error::InvalidInput`] if the table presence does not match
    /// the algorithm, or the padding is out of range.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        if self.table.is_some() != self.algorithm.has_table() {
            return Err(Error::InvalidInput(format!(
                "{} artifacts {} a code table",
                self.algorithm,
                if self.algorithm.has_table() {
                    "require"
                } else {
                    "cannot carry"
                }
            )));
        }
        if self.padding > 7 {
            return Err(Error::InvalidInput(format!(
                "padding must be between 0 and 7, got {}",
                self.padding
            )));
        }

        let mut out = Vec::with_capacity(MAGIC.len() + 2 + 1 + 8 + self.payload.len());
        out.extend_from_slice(&MAGIC);
        out.push(VERSION);
        out.push(self.algorithm.tag());

        if let Some(table) = &self.table {
            out.extend_from_slice(&to_u32(table.len(), "code table size")?.to_le_bytes());
            for (symbol, code) in table.iter() {
                out.extend_from_slice(&u32::from(symbol).to_le_bytes());
                out.extend_from_slice(&to_u32(code.len(), "code length")?.to_le_bytes());
                out.extend_from_slice(&bits::pack(code).bytes);
            }
        }

        out.push(self.padding);
        out.extend_from_slice(&(self.payload.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.payload);

        log::debug!(
            "serialized {} artifact: {} bytes ({} payload)",
            self.algorithm,
            out.len(),
            self.payload.len()
        );
        Ok(out)
    }

    /// Parses an artifact, validating every field.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let magic = reader.take(MAGIC.len())?;
        if magic != MAGIC {
            return Err(Error::Format(format!(
                "invalid magic number: expected {:?}, got {:?}",
                MAGIC, magic
            )));
        }
        let version = reader.u8()?;
        if version != VERSION {
            return Err(Error::Format(format!("unsupported version {version}")));
        }
        let algorithm = Algorithm::from_tag(reader.u8()?)?;

        let table = if algorithm.has_table() {
            Some(read_table(&mut reader)?)
        } else {
            None
        };

        let padding = reader.u8()?;
        if padding > 7 {
            return Err(Error::Format(format!(
                "padding must be between 0 and 7, got {padding}"
            )));
        }
        let payload_len = usize::try_from(reader.u64()?)
            .map_err(|_| Error::Format("payload length does not fit in memory".into()))?;
        let payload = reader.take(payload_len)?.to_vec();
        if payload.is_empty() && padding != 0 {
            return Err(Error::Format(format!(
                "padding of {padding} bits on an empty payload"
            )));
        }
        if reader.remaining() != 0 {
            return Err(Error::Format(format!(
                "{} trailing bytes after payload",
                reader.remaining()
            )));
        }

        Ok(Artifact {
            algorithm,
            table,
            padding,
            payload,
        })
    }
}

/// Serializes an artifact from its parts.
///
/// Fails with [`Error::InvalidInput`] if `table` is present for LZW or missing
/// for a prefix-code algorithm.
pub fn serialize(
    algorithm: Algorithm,
    table: Option<&CodeTable>,
    padding: u8,
    payload: &[u8],
) -> Result<Vec<u8>> {
    Artifact {
        algorithm,
        table: table.cloned(),
        padding,
        payload: payload.to_vec(),
    }
    .serialize()
}

/// Parses an artifact into (algorithm, table, padding, payload).
pub fn deserialize(bytes: &[u8]) -> Result<(Algorithm, Option<CodeTable>, u8, Vec<u8>)> {
    let artifact = Artifact::deserialize(bytes)?;
    Ok((
        artifact.algorithm,
        artifact.table,
        artifact.padding,
        artifact.payload,
    ))
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidInput(format!("{what} {value} exceeds u32")))
}

fn read_table(reader: &mut Reader<'_>) -> Result<CodeTable> {
    let count = reader.u32()? as usize;
    if count > reader.remaining() / MIN_ENTRY_SIZE {
        return Err(Error::Format(format!(
            "code table claims {count} entries but only {} bytes remain",
            reader.remaining()
        )));
    }

    let mut table = CodeTable::new();
    let mut seen = HashSet::with_capacity(count);
    for _ in 0..count {
        let scalar = reader.u32()?;
        let symbol = char::from_u32(scalar)
            .ok_or_else(|| Error::Format(format!("invalid symbol {scalar:#x} in code table")))?;
        if !seen.insert(symbol) {
            return Err(Error::Format(format!("duplicate symbol {symbol:?} in code table")));
        }

        let len = reader.u32()? as usize;
        if len == 0 {
            return Err(Error::Format(format!("empty code for symbol {symbol:?}")));
        }
        let packed = reader.take(len.div_ceil(8))?;
        let code = bits::unpack(packed, bits::padding_for(len))?;
        table.insert(symbol, code);
    }

    if !table.is_prefix_free() {
        return Err(Error::Format("code table is not prefix-free".into()));
    }
    Ok(table)
}

/// Bounds-checked little-endian cursor over the artifact bytes.
struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, position: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::Format(format!(
                "artifact too short: need {} more bytes at offset {}, have {}",
                len,
                self.position,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::bits::parse_bits;

    fn sample_table() -> CodeTable {
        [('a', "10"), ('b', "0"), ('c', "11")]
            .into_iter()
            .map(|(symbol, code)| (symbol, parse_bits(code).unwrap()))
            .collect()
    }

    fn sample() -> Artifact {
        Artifact::with_table(
            Algorithm::Huffman,
            sample_table(),
            bits::pack(&parse_bits("10100001111").unwrap()),
        )
    }

    #[test]
    fn test_layout() {
        let bytes = sample().serialize().unwrap();
        assert_eq!(&bytes[..4], b"TXPK");
        assert_eq!(bytes[4], VERSION);
        assert_eq!(bytes[5], Algorithm::Huffman.tag());
        assert_eq!(u32::from_le_bytes(bytes[6..10].try_into().unwrap()), 3);
        // Header, table of three 9-byte entries, padding, length, two payload bytes.
        assert_eq!(bytes.len(), 6 + 4 + 3 * 9 + 1 + 8 + 2);
    }

    #[test]
    fn test_round_trip_with_table() {
        let artifact = sample();
        let parsed = Artifact::deserialize(&artifact.serialize().unwrap()).unwrap();
        assert_eq!(parsed, artifact);
        assert_eq!(parsed.padding, 5);
    }

    #[test]
    fn test_round_trip_code_list() {
        let artifact = Artifact::code_list(PackedBits {
            bytes: vec![0x41, 0x80],
            padding: 7,
        });
        let bytes = artifact.serialize().unwrap();
        assert_eq!(bytes.len(), 6 + 1 + 8 + 2);
        assert_eq!(Artifact::deserialize(&bytes).unwrap(), artifact);
    }

    #[test]
    fn test_free_functions() {
        let table = sample_table();
        let bytes = serialize(Algorithm::Huffman, Some(&table), 3, &[0xAB]).unwrap();
        let (algorithm, parsed, padding, payload) = deserialize(&bytes).unwrap();
        assert_eq!(algorithm, Algorithm::Huffman);
        assert_eq!(parsed, Some(table));
        assert_eq!(padding, 3);
        assert_eq!(payload, vec![0xAB]);

        let bytes = serialize(Algorithm::Lzw, None, 0, &[1, 2]).unwrap();
        let (algorithm, parsed, _, _) = deserialize(&bytes).unwrap();
        assert_eq!(algorithm, Algorithm::Lzw);
        assert!(parsed.is_none());
    }

    #[test]
    fn test_free_serialize_keeps_shannon_fano_tag() {
        let table = sample_table();
        let bytes = serialize(Algorithm::ShannonFano, Some(&table), 5, &[0xA1, 0xE0]).unwrap();
        assert_eq!(bytes[5], Algorithm::ShannonFano.tag());
        let (algorithm, _, _, _) = deserialize(&bytes).unwrap();
        assert_eq!(algorithm, Algorithm::ShannonFano);
    }

    #[test]
    fn test_free_serialize_rejects_table_mismatch() {
        let table = sample_table();
        assert!(matches!(
            serialize(Algorithm::Lzw, Some(&table), 0, &[1]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            serialize(Algorithm::ShannonFano, None, 0, &[1]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_bad_magic_and_version() {
        let mut bytes = sample().serialize().unwrap();
        bytes[0] = b'X';
        assert!(matches!(Artifact::deserialize(&bytes), Err(Error::Format(_))));

        let mut bytes = sample().serialize().unwrap();
        bytes[4] = 9;
        assert!(matches!(Artifact::deserialize(&bytes), Err(Error::Format(_))));

        let mut bytes = sample().serialize().unwrap();
        bytes[5] = 42;
        assert!(matches!(Artifact::deserialize(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn test_rejects_truncation_and_trailing_bytes() {
        let bytes = sample().serialize().unwrap();
        for len in 0..bytes.len() {
            assert!(
                matches!(Artifact::deserialize(&bytes[..len]), Err(Error::Format(_))),
                "prefix of length {len} parsed"
            );
        }
        let mut extended = bytes.clone();
        extended.push(0);
        assert!(matches!(Artifact::deserialize(&extended), Err(Error::Format(_))));
    }

    #[test]
    fn test_rejects_bad_padding() {
        let mut bytes = sample().serialize().unwrap();
        let padding_offset = bytes.len() - 2 - 8 - 1;
        bytes[padding_offset] = 8;
        assert!(matches!(Artifact::deserialize(&bytes), Err(Error::Format(_))));

        let artifact = Artifact {
            padding: 8,
            ..sample()
        };
        assert!(matches!(artifact.serialize(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_non_prefix_free_table() {
        let table: CodeTable = [('a', "1"), ('b', "10")]
            .into_iter()
            .map(|(symbol, code)| (symbol, parse_bits(code).unwrap()))
            .collect();
        let bytes = Artifact::with_table(Algorithm::ShannonFano, table, PackedBits::default())
            .serialize()
            .unwrap();
        assert!(matches!(Artifact::deserialize(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn test_rejects_table_mismatch() {
        let artifact = Artifact {
            table: None,
            ..sample()
        };
        assert!(matches!(artifact.serialize(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_expect_algorithm() {
        assert!(sample().expect_algorithm(Algorithm::Huffman).is_ok());
        assert!(matches!(
            sample().expect_algorithm(Algorithm::Lzw),
            Err(Error::Format(_))
        ));
    }
}
