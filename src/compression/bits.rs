//! Bit packing shared by every codec.
//!
//! Codes are accumulated as a `BitVec` in most-significant-bit-first order and
//! packed into whole bytes, with the number of trailing zero bits recorded so
//! that unpacking recovers the exact bit length.

use bitvec::prelude::*;

use crate::error::{Error, Result};

/// An owned bit string, most significant bit first.
pub type Bits = BitVec<u8, Msb0>;

/// A byte buffer plus the count of zero bits appended to reach byte alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedBits {
    pub bytes: Vec<u8>,
    /// Always in `0..=7`; zero when the bit length was already a multiple of 8.
    pub padding: u8,
}

/// Number of zero bits needed to round `len` bits up to a whole byte.
pub fn padding_for(len: usize) -> u8 {
    ((8 - len % 8) % 8) as u8
}

/// Packs a bit string into bytes, right-padding the last byte with zeros.
pub fn pack(bits: &BitSlice<u8, Msb0>) -> PackedBits {
    let padding = padding_for(bits.len());
    let mut padded = bitvec![u8, Msb0; 0; bits.len() + padding as usize];
    padded[..bits.len()].copy_from_bitslice(bits);
    PackedBits {
        bytes: padded.into_vec(),
        padding,
    }
}

/// Expands bytes back into a bit string and drops the trailing `padding` bits.
///
/// Fails with [`Error::Format`] when `padding` is outside `0..=7` or claims
/// padding bits on an empty buffer.
pub fn unpack(bytes: &[u8], padding: u8) -> Result<Bits> {
    if padding > 7 {
        return Err(Error::Format(format!(
            "padding must be between 0 and 7, got {padding}"
        )));
    }
    if bytes.is_empty() && padding != 0 {
        return Err(Error::Format(format!(
            "padding of {padding} bits on an empty payload"
        )));
    }

    let mut bits = bytes.view_bits::<Msb0>().to_bitvec();
    bits.truncate(bits.len() - padding as usize);
    Ok(bits)
}

/// Parses a textual bit string such as `"0110"`.
pub fn parse_bits(text: &str) -> Result<Bits> {
    text.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(Error::InvalidInput(format!(
                "'{other}' is not a binary digit"
            ))),
        })
        .collect()
}

/// Renders bits as a string of `'0'` and `'1'`.
pub fn to_bit_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter()
        .by_vals()
        .map(|b| if b { '1' } else { '0' })
        .collect()
}

/// Appends the low `width` bits of `value`, most significant first.
pub(crate) fn push_code(bits: &mut Bits, value: u32, width: u8) {
    for shift in (0..width).rev() {
        bits.push((value >> shift) & 1 == 1);
    }
}

/// Reads an unsigned integer from a slice of at most 32 bits, MSB first.
pub(crate) fn read_code(bits: &BitSlice<u8, Msb0>) -> u32 {
    bits.iter()
        .by_vals()
        .fold(0u32, |acc, bit| (acc << 1) | u32::from(bit))
}
