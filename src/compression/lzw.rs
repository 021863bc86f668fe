//! LZW dictionary compression over bytes.
//!
//! Both sides seed the dictionary with the 256 single-byte sequences and grow
//! it by one entry per step, so the dictionary is never transmitted. Codes are
//! bounded by a configurable maximum width; outgrowing it is an error rather
//! than silent unbounded growth.
//!
//! In the artifact, code `i` of the stream is written with just enough bits to
//! hold any code that could legally appear at that position (`255 + i`), so
//! the reader recovers each width without a stored width field.

use std::collections::HashMap;

use bitvec::prelude::*;

use super::bits::{self, Bits, PackedBits};
use super::container::Artifact;
use super::{Algorithm, Compression, Result};
use crate::error::Error;

/// Number of single-byte sequences every dictionary starts with.
pub const SEED_SIZE: u32 = 256;

/// Default upper bound on the width of a dictionary code.
pub const DEFAULT_MAX_CODE_WIDTH: u8 = 24;

/// Configuration for [`LzwCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwConfig {
    max_code_width: u8,
}

impl LzwConfig {
    /// Creates a configuration with the given maximum code width in bits.
    ///
    /// The width must leave room beyond the seed (at least 9) and fit a `u32`.
    pub fn new(max_code_width: u8) -> Result<Self> {
        if !(9..=32).contains(&max_code_width) {
            return Err(Error::InvalidInput(format!(
                "maximum code width must be between 9 and 32 bits, got {max_code_width}"
            )));
        }
        Ok(LzwConfig { max_code_width })
    }

    pub fn max_code_width(&self) -> u8 {
        self.max_code_width
    }

    /// Largest code value the dictionary may assign.
    pub fn max_code(&self) -> u32 {
        u32::MAX >> (32 - u32::from(self.max_code_width))
    }
}

impl Default for LzwConfig {
    fn default() -> Self {
        LzwConfig {
            max_code_width: DEFAULT_MAX_CODE_WIDTH,
        }
    }
}

/// Compression-side dictionary.
///
/// Each learned sequence is stored as (code of its prefix, final byte), which
/// is enough to extend the current match one byte at a time.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: HashMap<(u32, u8), u32>,
    next_code: u32,
    config: LzwConfig,
}

impl Dictionary {
    /// A dictionary holding only the 256 single-byte sequences.
    pub fn seeded(config: LzwConfig) -> Self {
        Dictionary {
            entries: HashMap::new(),
            next_code: SEED_SIZE,
            config,
        }
    }

    /// Total number of entries, seed included.
    pub fn len(&self) -> usize {
        self.next_code as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next_code == 0
    }

    /// Number of entries added beyond the seed.
    pub fn learned(&self) -> usize {
        (self.next_code - SEED_SIZE) as usize
    }

    /// The code the next inserted sequence will receive.
    pub fn next_code(&self) -> u32 {
        self.next_code
    }

    /// Code of `prefix` extended by `byte`, if that sequence is known.
    pub fn extend(&self, prefix: u32, byte: u8) -> Option<u32> {
        self.entries.get(&(prefix, byte)).copied()
    }

    /// Code of a whole byte sequence, if it is known.
    pub fn code_of(&self, sequence: &[u8]) -> Option<u32> {
        let (&first, rest) = sequence.split_first()?;
        rest.iter()
            .try_fold(u32::from(first), |code, &byte| self.extend(code, byte))
    }

    fn insert(&mut self, prefix: u32, byte: u8) -> Result<u32> {
        if self.next_code > self.config.max_code() {
            return Err(Error::CapacityExceeded {
                max_code_width: self.config.max_code_width(),
            });
        }
        let code = self.next_code;
        self.next_code = code.checked_add(1).ok_or(Error::CapacityExceeded {
            max_code_width: self.config.max_code_width(),
        })?;
        self.entries.insert((prefix, byte), code);
        Ok(code)
    }
}

/// Width in bits of the code at `index` in a stream, or `None` past 32 bits.
pub fn code_width(index: usize) -> Option<u8> {
    let limit = u64::from(SEED_SIZE - 1) + index as u64;
    let width = (u64::BITS - limit.leading_zeros()) as u8;
    (width <= 32).then_some(width)
}

/// Packs a code stream with position-dependent widths.
pub fn pack_codes(codes: &[u32]) -> Result<PackedBits> {
    let mut stream = Bits::new();
    for (index, &code) in codes.iter().enumerate() {
        let width = code_width(index).ok_or_else(|| {
            Error::InvalidInput(format!("code stream of {} codes is too long", codes.len()))
        })?;
        if width < 32 && code >> width != 0 {
            return Err(Error::InvalidInput(format!(
                "code {code} at position {index} does not fit in {width} bits"
            )));
        }
        bits::push_code(&mut stream, code, width);
    }
    Ok(bits::pack(&stream))
}

/// Reads back a code stream written by [`pack_codes`].
pub fn unpack_codes(stream: &BitSlice<u8, Msb0>) -> Result<Vec<u32>> {
    let mut codes = Vec::new();
    let mut position = 0;
    while position < stream.len() {
        let width = code_width(codes.len())
            .ok_or_else(|| Error::Format("code stream is longer than any dictionary".into()))?
            as usize;
        if stream.len() - position < width {
            return Err(Error::Format(format!(
                "truncated code stream: {} bits left for a {}-bit code",
                stream.len() - position,
                width
            )));
        }
        codes.push(bits::read_code(&stream[position..position + width]));
        position += width;
    }
    Ok(codes)
}

/// LZW codec producing self-describing artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzwCodec {
    config: LzwConfig,
}

impl LzwCodec {
    pub fn new(config: LzwConfig) -> Self {
        LzwCodec { config }
    }

    pub fn config(&self) -> LzwConfig {
        self.config
    }

    /// Compresses `input` into a sequence of dictionary codes.
    ///
    /// # Example
    ///
    /// ```
    /// use textpack::compression::lzw::LzwCodec;
    ///
    /// let codes = LzwCodec::default().compress_codes(b"TOBEORNOTTOBE").unwrap();
    /// assert!(!codes.is_empty());
    /// ```
    pub fn compress_codes(&self, input: &[u8]) -> Result<Vec<u32>> {
        self.compress_with_dictionary(input).map(|(codes, _)| codes)
    }

    /// Like [`compress_codes`](Self::compress_codes), also returning the final dictionary.
    pub fn compress_with_dictionary(&self, input: &[u8]) -> Result<(Vec<u32>, Dictionary)> {
        let mut dict = Dictionary::seeded(self.config);
        let mut codes = Vec::new();
        // Code of the current match `w`; `None` while `w` is empty.
        let mut w: Option<u32> = None;

        for &byte in input {
            w = Some(match w {
                None => u32::from(byte),
                Some(prefix) => match dict.extend(prefix, byte) {
                    Some(code) => code,
                    None => {
                        codes.push(prefix);
                        dict.insert(prefix, byte)?;
                        u32::from(byte)
                    }
                },
            });
        }
        if let Some(prefix) = w {
            codes.push(prefix);
        }

        log::debug!(
            "lzw: {} bytes -> {} codes, {} learned entries",
            input.len(),
            codes.len(),
            dict.learned()
        );
        Ok((codes, dict))
    }

    /// Rebuilds the original bytes from a code sequence.
    ///
    /// # Example
    ///
    /// ```
    /// use textpack::compression::lzw::LzwCodec;
    ///
    /// let codec = LzwCodec::default();
    /// let codes = codec.compress_codes(b"TOBEORNOTTOBE").unwrap();
    /// assert_eq!(codec.decompress_codes(&codes).unwrap(), b"TOBEORNOTTOBE");
    /// ```
    pub fn decompress_codes(&self, codes: &[u32]) -> Result<Vec<u8>> {
        // Learned entries as (prefix code, final byte), indexed by `code - SEED_SIZE`.
        let mut learned: Vec<(u32, u8)> = Vec::new();
        let mut result = Vec::new();

        let Some((&first, rest)) = codes.split_first() else {
            return Ok(result);
        };
        if first >= SEED_SIZE {
            return Err(Error::CorruptData(format!("bad compressed code: {first}")));
        }
        result.push(first as u8);
        let mut w = first;

        for &code in rest {
            let next_code = SEED_SIZE as usize + learned.len();
            let entry_start = match (code as usize).cmp(&next_code) {
                std::cmp::Ordering::Less => write_entry(&learned, code, &mut result),
                std::cmp::Ordering::Equal => {
                    // The code names the entry about to be created: w + w[0].
                    let w_first = write_entry(&learned, w, &mut result);
                    result.push(w_first);
                    w_first
                }
                std::cmp::Ordering::Greater => {
                    return Err(Error::CorruptData(format!("bad compressed code: {code}")));
                }
            };
            learned.push((w, entry_start));
            w = code;
        }

        log::debug!(
            "lzw: {} codes -> {} bytes, {} learned entries",
            codes.len(),
            result.len(),
            learned.len()
        );
        Ok(result)
    }
}

/// Appends the bytes of `code` to `out` by unwinding its prefix chain, and
/// returns the entry's first byte.
fn write_entry(learned: &[(u32, u8)], mut code: u32, out: &mut Vec<u8>) -> u8 {
    let start = out.len();
    while code >= SEED_SIZE {
        let (prefix, byte) = learned[(code - SEED_SIZE) as usize];
        out.push(byte);
        code = prefix;
    }
    out.push(code as u8);
    out[start..].reverse();
    out[start]
}

impl Compression for LzwCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Lzw
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let codes = self.compress_codes(data)?;
        let packed = pack_codes(&codes)?;
        Artifact::code_list(packed).serialize()
    }

    fn decompress_artifact(&self, artifact: Artifact) -> Result<Vec<u8>> {
        let artifact = artifact.expect_algorithm(Algorithm::Lzw)?;
        let stream = bits::unpack(&artifact.payload, artifact.padding)?;
        let codes = unpack_codes(&stream)?;
        self.decompress_codes(&codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOBEORNOT: &[u8] = b"TOBEORNOTTOBEORTOBEORNOT";

    #[test]
    fn test_empty_input() {
        let codec = LzwCodec::default();
        let codes = codec.compress_codes(b"").unwrap();
        assert!(codes.is_empty());
        assert!(codec.decompress_codes(&codes).unwrap().is_empty());
    }

    #[test]
    fn test_known_code_stream() {
        let codec = LzwCodec::default();
        let (codes, dict) = codec.compress_with_dictionary(TOBEORNOT).unwrap();
        assert_eq!(
            codes,
            vec![84, 79, 66, 69, 79, 82, 78, 79, 84, 256, 258, 260, 265, 259, 261, 263]
        );
        // One new entry per emitted code except the last.
        assert_eq!(dict.learned(), codes.len() - 1);
        assert_eq!(dict.len(), 256 + 15);
        assert_eq!(dict.code_of(b"TO"), Some(256));
        assert_eq!(dict.code_of(b"TOB"), Some(265));
        assert_eq!(dict.code_of(b"ZZ"), None);
        assert_eq!(codec.decompress_codes(&codes).unwrap(), TOBEORNOT);
    }

    #[test]
    fn test_single_character() {
        // Exercises the code that refers to the entry about to be created.
        let codec = LzwCodec::default();
        let codes = codec.compress_codes(b"AAAAAAA").unwrap();
        assert_eq!(codes, vec![65, 256, 257, 65]);
        assert_eq!(codec.decompress_codes(&codes).unwrap(), b"AAAAAAA");
    }

    #[test]
    fn test_bad_code_is_corrupt() {
        let codec = LzwCodec::default();
        assert!(matches!(
            codec.decompress_codes(&[65, 300]),
            Err(Error::CorruptData(_))
        ));
        assert!(matches!(
            codec.decompress_codes(&[256]),
            Err(Error::CorruptData(_))
        ));
    }

    #[test]
    fn test_long_prefix_chains() {
        let codec = LzwCodec::default();
        let runs = vec![b'a'; 5000];
        let pairs: Vec<u8> = b"ab".iter().copied().cycle().take(4001).collect();
        for input in [runs, pairs] {
            let (codes, dict) = codec.compress_with_dictionary(&input).unwrap();
            assert!(codes.len() < input.len() / 10);
            assert_eq!(dict.learned(), codes.len() - 1);
            assert_eq!(codec.decompress_codes(&codes).unwrap(), input);
        }
    }

    #[test]
    fn test_write_entry_unwinds_chain() {
        // 256 = "ab", 257 = "abc"
        let learned = [(u32::from(b'a'), b'b'), (256, b'c')];
        let mut out = b"x".to_vec();
        assert_eq!(write_entry(&learned, 257, &mut out), b'a');
        assert_eq!(out, b"xabc");
        assert_eq!(write_entry(&learned, u32::from(b'z'), &mut out), b'z');
        assert_eq!(out, b"xabcz");
    }

    #[test]
    fn test_non_ascii() {
        let codec = LzwCodec::default();
        let input = "这是一段测试".as_bytes();
        let codes = codec.compress_codes(input).unwrap();
        assert_eq!(codec.decompress_codes(&codes).unwrap(), input);
    }

    #[test]
    fn test_capacity_exceeded() {
        let codec = LzwCodec::new(LzwConfig::new(9).unwrap());
        // Pseudo-random bytes rarely repeat a pair, so nearly every byte emits a
        // code and the 256 free codes of a 9-bit dictionary run out.
        let mut state = 0x2545_f491_u32;
        let shuffled: Vec<u8> = (0..2048)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();
        assert!(matches!(
            codec.compress_codes(&shuffled),
            Err(Error::CapacityExceeded { max_code_width: 9 })
        ));
    }

    #[test]
    fn test_config_bounds() {
        assert!(LzwConfig::new(8).is_err());
        assert!(LzwConfig::new(33).is_err());
        assert_eq!(LzwConfig::new(9).unwrap().max_code(), 511);
        assert_eq!(LzwConfig::new(32).unwrap().max_code(), u32::MAX);
        assert_eq!(LzwConfig::default().max_code_width(), DEFAULT_MAX_CODE_WIDTH);
    }

    #[test]
    fn test_code_width() {
        assert_eq!(code_width(0), Some(8));
        assert_eq!(code_width(1), Some(9));
        assert_eq!(code_width(256), Some(9));
        assert_eq!(code_width(257), Some(10));
    }

    #[test]
    fn test_pack_codes_round_trip() {
        let codes = LzwCodec::default().compress_codes(TOBEORNOT).unwrap();
        let packed = pack_codes(&codes).unwrap();
        // 8 bits for the first code, 9 for the remaining fifteen.
        assert_eq!(packed.bytes.len(), (8 + 15 * 9usize).div_ceil(8));
        let stream = bits::unpack(&packed.bytes, packed.padding).unwrap();
        assert_eq!(unpack_codes(&stream).unwrap(), codes);
    }

    #[test]
    fn test_unpack_truncated() {
        let mut stream = Bits::new();
        bits::push_code(&mut stream, 65, 8);
        bits::push_code(&mut stream, 1, 4);
        assert!(matches!(unpack_codes(&stream), Err(Error::Format(_))));
    }

    #[test]
    fn test_codec_round_trip() {
        let codec = LzwCodec::default();
        let compressed = codec.compress(TOBEORNOT).unwrap();
        assert_eq!(codec.decompress(&compressed).unwrap(), TOBEORNOT);
    }
}
