//! Bit-packing helpers.
//!
//! Two small packed `u32` layouts are used throughout the planner:
//!
//! - [`Bits24x8`]: a 24-bit index in the high bits and an 8-bit count in
//!   the low bits. Criterion payloads use it as `(connection id, count)`.
//! - [`PackedRange`]: a half-open integer interval stored as a 24-bit start
//!   and an 8-bit length. The transfer index uses it to describe the run of
//!   transfers arriving at one station.

use std::fmt;
use std::ops::Range;

/// Error returned when a value does not fit its bit field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} value {value} does not fit in {bits} bits")]
pub struct BitsError {
    field: &'static str,
    value: u64,
    bits: u32,
}

impl BitsError {
    fn new(field: &'static str, value: u64, bits: u32) -> Self {
        Self { field, value, bits }
    }
}

const MAX_24: u32 = (1 << 24) - 1;
const MAX_8: u32 = (1 << 8) - 1;

/// A 24-bit index and an 8-bit count packed into one `u32`.
///
/// # Examples
///
/// ```
/// use transit_server::bits::Bits24x8;
///
/// let packed = Bits24x8::pack(1234, 7).unwrap();
/// assert_eq!(Bits24x8::unpack24(packed), 1234);
/// assert_eq!(Bits24x8::unpack8(packed), 7);
///
/// assert!(Bits24x8::pack(1 << 24, 0).is_err());
/// ```
pub struct Bits24x8;

impl Bits24x8 {
    /// Packs `high` (24 bits) and `low` (8 bits).
    pub fn pack(high: u32, low: u32) -> Result<u32, BitsError> {
        if high > MAX_24 {
            return Err(BitsError::new("index", high as u64, 24));
        }
        if low > MAX_8 {
            return Err(BitsError::new("count", low as u64, 8));
        }
        Ok((high << 8) | low)
    }

    /// Returns the 24-bit index.
    pub fn unpack24(packed: u32) -> u32 {
        packed >> 8
    }

    /// Returns the 8-bit count.
    pub fn unpack8(packed: u32) -> u32 {
        packed & MAX_8
    }
}

/// A half-open interval `[start, end)` packed into a `u32`.
///
/// The start occupies 24 bits and the length 8 bits, so a range covers at
/// most 255 elements.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedRange(u32);

impl PackedRange {
    /// Packs the interval `[start, end)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::bits::PackedRange;
    ///
    /// let range = PackedRange::new(10, 13).unwrap();
    /// assert_eq!(range.start(), 10);
    /// assert_eq!(range.end(), 13);
    /// assert_eq!(range.len(), 3);
    /// assert_eq!(range.iter().collect::<Vec<_>>(), vec![10, 11, 12]);
    /// ```
    pub fn new(start: u32, end: u32) -> Result<Self, BitsError> {
        if end < start {
            return Err(BitsError::new("range length", 0, 8));
        }
        Bits24x8::pack(start, end - start)
            .map(PackedRange)
            .map_err(|_| {
                if start > MAX_24 {
                    BitsError::new("range start", start as u64, 24)
                } else {
                    BitsError::new("range length", (end - start) as u64, 8)
                }
            })
    }

    /// Rebuilds a range from its packed form.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the packed form.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Inclusive start of the interval.
    pub fn start(&self) -> usize {
        Bits24x8::unpack24(self.0) as usize
    }

    /// Exclusive end of the interval.
    pub fn end(&self) -> usize {
        self.start() + self.len()
    }

    /// Number of elements covered.
    pub fn len(&self) -> usize {
        Bits24x8::unpack8(self.0) as usize
    }

    /// Returns true if the interval is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the covered indices.
    pub fn iter(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

impl fmt::Debug for PackedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedRange({}..{})", self.start(), self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_24_8_layout() {
        let packed = Bits24x8::pack(0x00AB_CDEF, 0x12).unwrap();
        assert_eq!(packed, 0xABCD_EF12);
        assert_eq!(Bits24x8::unpack24(packed), 0x00AB_CDEF);
        assert_eq!(Bits24x8::unpack8(packed), 0x12);
    }

    #[test]
    fn bits_24_8_limits() {
        assert!(Bits24x8::pack(MAX_24, MAX_8).is_ok());
        assert!(Bits24x8::pack(MAX_24 + 1, 0).is_err());
        assert!(Bits24x8::pack(0, 256).is_err());
    }

    #[test]
    fn bits_error_display() {
        let err = Bits24x8::pack(0, 300).unwrap_err();
        assert_eq!(err.to_string(), "count value 300 does not fit in 8 bits");
    }

    #[test]
    fn empty_range() {
        let range = PackedRange::new(42, 42).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.start(), 42);
        assert_eq!(range.iter().count(), 0);
    }

    #[test]
    fn range_rejects_bad_bounds() {
        assert!(PackedRange::new(5, 4).is_err());
        assert!(PackedRange::new(0, 256).is_err());
        assert!(PackedRange::new(1 << 24, (1 << 24) + 1).is_err());
    }

    #[test]
    fn range_bits_roundtrip() {
        let range = PackedRange::new(1000, 1255).unwrap();
        let copy = PackedRange::from_bits(range.bits());
        assert_eq!(copy, range);
        assert_eq!(copy.len(), 255);
        assert_eq!(format!("{copy:?}"), "PackedRange(1000..1255)");
    }
}
