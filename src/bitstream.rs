//! Bitstream
//!
//! An ordered, explicitly sized sequence of bits. Multi-bit fields are
//! written and read most significant bit first.

use std::fmt;
use std::ops::Range;

/// Ordered sequence of bits with an explicit length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bitstream {
    bits: Vec<bool>,
}

impl Bitstream {
    /// Create an empty bitstream
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Create an empty bitstream with room for `capacity` bits
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity),
        }
    }

    /// Number of bits
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Append a single bit
    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Append the low `width` bits of `value`, most significant first.
    ///
    /// # Panics
    /// Panics if `width > 64`.
    pub fn push_uint(&mut self, value: u64, width: usize) {
        assert!(width <= 64, "field width {} exceeds 64 bits", width);
        self.bits.reserve(width);
        for shift in (0..width).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
    }

    /// Append all bits of another stream
    pub fn extend_from(&mut self, other: &Bitstream) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Bit at `index`, if present
    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Read a `width`-bit unsigned field starting at `offset`.
    ///
    /// Returns `None` when the field runs past the end of the stream or
    /// `width > 64`.
    pub fn read_uint(&self, offset: usize, width: usize) -> Option<u64> {
        if width > 64 {
            return None;
        }
        let end = offset.checked_add(width)?;
        let field = self.bits.get(offset..end)?;
        Some(
            field
                .iter()
                .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit)),
        )
    }

    /// Copy of the bits in `range`, clamped to the stream length
    pub fn slice(&self, range: Range<usize>) -> Bitstream {
        let end = range.end.min(self.bits.len());
        let start = range.start.min(end);
        Self {
            bits: self.bits[start..end].to_vec(),
        }
    }

    /// Shorten the stream to at most `len` bits
    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }

    /// Append zero bits until the length is a multiple of `multiple`.
    ///
    /// Returns the number of bits added.
    pub fn pad_to_multiple(&mut self, multiple: usize) -> usize {
        if multiple == 0 {
            return 0;
        }
        let remainder = self.bits.len() % multiple;
        if remainder == 0 {
            return 0;
        }
        let added = multiple - remainder;
        self.bits.resize(self.bits.len() + added, false);
        added
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Pack into bytes, most significant bit first; the last byte is
    /// zero-padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &bit)| acc | (u8::from(bit) << (7 - i)))
            })
            .collect()
    }
}

impl From<Vec<bool>> for Bitstream {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl FromIterator<bool> for Bitstream {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Bitstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_uint_is_msb_first() {
        let mut bits = Bitstream::new();
        bits.push_uint(0b1011, 4);
        bits.push_uint(1, 3);
        assert_eq!(bits.to_string(), "1011001");
        assert_eq!(bits.len(), 7);
    }

    #[test]
    fn test_read_uint() {
        let mut bits = Bitstream::new();
        bits.push_uint(0xDEAD_BEEF, 32);
        bits.push_uint(8000, 16);

        assert_eq!(bits.read_uint(0, 32), Some(0xDEAD_BEEF));
        assert_eq!(bits.read_uint(32, 16), Some(8000));
        assert_eq!(bits.read_uint(40, 16), None);
        assert_eq!(bits.read_uint(0, 65), None);
    }

    #[test]
    fn test_slice_clamps() {
        let bits: Bitstream = [true, false, true, true].into_iter().collect();
        assert_eq!(bits.slice(1..3).to_string(), "01");
        assert_eq!(bits.slice(2..100).to_string(), "11");
        assert!(bits.slice(10..20).is_empty());
    }

    #[test]
    fn test_pad_to_multiple() {
        let mut bits: Bitstream = vec![true; 5].into();
        assert_eq!(bits.pad_to_multiple(16), 11);
        assert_eq!(bits.len(), 16);
        assert_eq!(bits.read_uint(0, 16), Some(0b1111_1000_0000_0000));
        assert_eq!(bits.pad_to_multiple(16), 0);
    }

    #[test]
    fn test_to_bytes() {
        let mut bits = Bitstream::new();
        bits.push_uint(0xA5, 8);
        bits.push_uint(0b101, 3);
        assert_eq!(bits.to_bytes(), vec![0xA5, 0b1010_0000]);
    }
}
