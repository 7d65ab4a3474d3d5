/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The FIX checksum is the sum of all bytes in the message (excluding the
//! checksum field itself) modulo 256, formatted as a 3-digit zero-padded string.
//!
//! The sum is computed by one of the [`Strategy`] implementations. Wider
//! strategies reorder the additions but, since addition modulo 256 is
//! associative and commutative, always land on the same value.

use crate::simd::Strategy;
use flashfix_core::wire::{CHECKSUM_TAG, SOH, TRAILER_LEN};

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Calculates the FIX checksum for the given data.
///
/// The checksum is the sum of all bytes modulo 256.
///
/// # Arguments
/// * `data` - The message bytes to checksum (excluding the 10=XXX| field)
///
/// # Returns
/// The checksum value as a u8 (0-255).
///
/// # Example
/// ```
/// use flashfix_tagvalue::calculate_checksum;
///
/// let data = b"8=FIX.4.4\x019=5\x0135=0\x01";
/// let checksum = calculate_checksum(data);
/// assert_eq!(checksum, 163);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    checksum_with(Strategy::detect(), data)
}

/// Calculates the FIX checksum with an explicit strategy.
///
/// Unsupported strategies fall back to the widest supported narrower one.
#[must_use]
pub fn checksum_with(strategy: Strategy, data: &[u8]) -> u8 {
    match strategy.resolve() {
        Strategy::Scalar => checksum_scalar(data),
        Strategy::Word => checksum_word(data),
        // SAFETY: SSE2 is part of the x86_64 baseline.
        #[cfg(target_arch = "x86_64")]
        Strategy::Sse2 => unsafe { checksum_sse2(data) },
        // SAFETY: `resolve` only yields Avx2 when the CPU reports it.
        #[cfg(target_arch = "x86_64")]
        Strategy::Avx2 => unsafe { checksum_avx2(data) },
        #[cfg(not(target_arch = "x86_64"))]
        Strategy::Sse2 | Strategy::Avx2 => checksum_word(data),
    }
}

/// Byte-at-a-time checksum.
#[inline]
fn checksum_scalar(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Horizontal sum of the eight bytes of a word.
#[inline(always)]
const fn fold_word(mut word: u64) -> u64 {
    word = (word & 0x00FF_00FF_00FF_00FF) + ((word >> 8) & 0x00FF_00FF_00FF_00FF);
    word = (word & 0x0000_FFFF_0000_FFFF) + ((word >> 16) & 0x0000_FFFF_0000_FFFF);
    (word & 0x0000_0000_FFFF_FFFF) + (word >> 32)
}

/// Eight bytes per iteration, summed inside a `u64`.
fn checksum_word(data: &[u8]) -> u8 {
    let chunks = data.chunks_exact(8);
    let tail = chunks.remainder();

    let mut sum: u64 = 0;
    for chunk in chunks {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        sum = sum.wrapping_add(fold_word(u64::from_le_bytes(word)));
    }

    (sum as u8).wrapping_add(checksum_scalar(tail))
}

/// Sixteen bytes per iteration using `psadbw` against zero.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn checksum_sse2(data: &[u8]) -> u8 {
    let chunks = data.chunks_exact(16);
    let tail = chunks.remainder();

    let mut lanes = [0u64; 2];
    unsafe {
        let zero = _mm_setzero_si128();
        let mut acc = _mm_setzero_si128();
        for chunk in chunks {
            let vec = _mm_loadu_si128(chunk.as_ptr().cast());
            acc = _mm_add_epi64(acc, _mm_sad_epu8(vec, zero));
        }
        _mm_storeu_si128(lanes.as_mut_ptr().cast(), acc);
    }

    let sum = lanes[0].wrapping_add(lanes[1]);
    (sum as u8).wrapping_add(checksum_word(tail))
}

/// Thirty-two bytes per iteration using `vpsadbw` against zero.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn checksum_avx2(data: &[u8]) -> u8 {
    let chunks = data.chunks_exact(32);
    let tail = chunks.remainder();

    let mut lanes = [0u64; 4];
    unsafe {
        let zero = _mm256_setzero_si256();
        let mut acc = _mm256_setzero_si256();
        for chunk in chunks {
            let vec = _mm256_loadu_si256(chunk.as_ptr().cast());
            acc = _mm256_add_epi64(acc, _mm256_sad_epu8(vec, zero));
        }
        _mm256_storeu_si256(lanes.as_mut_ptr().cast(), acc);
    }

    let sum = lanes.iter().fold(0u64, |acc, &lane| acc.wrapping_add(lane));
    (sum as u8).wrapping_add(checksum_word(tail))
}

/// Running checksum over a message that is not contiguous in memory.
///
/// Feeding the same bytes in any split yields the same result as
/// [`calculate_checksum`] over their concatenation.
#[derive(Debug, Clone, Copy)]
pub struct ChecksumAccumulator {
    sum: u8,
    strategy: Strategy,
}

impl ChecksumAccumulator {
    /// Creates an accumulator using the detected strategy.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategy(Strategy::detect())
    }

    /// Creates an accumulator using an explicit strategy.
    #[inline]
    #[must_use]
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            sum: 0,
            strategy: strategy.resolve(),
        }
    }

    /// Adds `data` to the running sum.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.sum = self.sum.wrapping_add(checksum_with(self.strategy, data));
    }

    /// Returns the checksum of everything fed so far.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.sum
    }
}

impl Default for ChecksumAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a checksum value as a 3-digit zero-padded string.
///
/// # Arguments
/// * `checksum` - The checksum value (0-255)
///
/// # Returns
/// A 3-character string representation (e.g., "042", "255").
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    let d0 = b'0' + (checksum / 100);
    let d1 = b'0' + ((checksum / 10) % 10);
    let d2 = b'0' + (checksum % 10);
    [d0, d1, d2]
}

/// Builds the complete trailer field `10=ddd<SOH>`.
#[inline]
#[must_use]
pub fn checksum_field(checksum: u8) -> [u8; TRAILER_LEN] {
    let digits = format_checksum(checksum);
    let mut field = [0u8; TRAILER_LEN];
    field[..CHECKSUM_TAG.len()].copy_from_slice(CHECKSUM_TAG);
    field[CHECKSUM_TAG.len()..TRAILER_LEN - 1].copy_from_slice(&digits);
    field[TRAILER_LEN - 1] = SOH;
    field
}

/// Parses a 3-digit checksum string to a u8 value.
///
/// # Arguments
/// * `bytes` - The 3-byte checksum string
///
/// # Returns
/// `Some(checksum)` if valid, `None` otherwise (including values above 255).
#[inline]
#[must_use]
pub fn parse_checksum(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 3 {
        return None;
    }

    let d0 = bytes[0].checked_sub(b'0')?;
    let d1 = bytes[1].checked_sub(b'0')?;
    let d2 = bytes[2].checked_sub(b'0')?;

    if d0 > 9 || d1 > 9 || d2 > 9 {
        return None;
    }

    let value = u16::from(d0) * 100 + u16::from(d1) * 10 + u16::from(d2);
    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 37 + 11) as u8).collect()
    }

    #[test]
    fn test_calculate_checksum_empty() {
        assert_eq!(calculate_checksum(b""), 0);
        for strategy in Strategy::ALL {
            assert_eq!(checksum_with(strategy, b""), 0);
        }
    }

    #[test]
    fn test_calculate_checksum_simple() {
        let data = b"ABC";
        let expected = (b'A' as u32 + b'B' as u32 + b'C' as u32) % 256;
        assert_eq!(calculate_checksum(data), expected as u8);
    }

    #[test]
    fn test_calculate_checksum_overflow() {
        let data = vec![255u8; 1000];
        let expected = ((255u32 * 1000) % 256) as u8;
        assert_eq!(calculate_checksum(&data), expected);
    }

    #[test]
    fn test_strategies_agree() {
        // Lengths straddle every chunk width and its remainders.
        for len in [0, 1, 7, 8, 9, 15, 16, 17, 31, 32, 33, 63, 64, 65, 200, 1021] {
            let data = sample(len);
            let expected = checksum_scalar(&data);
            for strategy in Strategy::ALL {
                assert_eq!(
                    checksum_with(strategy, &data),
                    expected,
                    "strategy {strategy} len {len}"
                );
            }
        }
    }

    #[test]
    fn test_checksum_is_pure_and_associative() {
        let data = sample(300);
        assert_eq!(calculate_checksum(&data), calculate_checksum(&data));
        for split in [0, 1, 13, 150, 299, 300] {
            let (a, b) = data.split_at(split);
            assert_eq!(
                calculate_checksum(a).wrapping_add(calculate_checksum(b)),
                calculate_checksum(&data)
            );
        }
    }

    #[test]
    fn test_accumulator_matches_contiguous() {
        let data = sample(97);
        let mut acc = ChecksumAccumulator::with_strategy(Strategy::Word);
        for piece in data.chunks(10) {
            acc.update(piece);
        }
        assert_eq!(acc.value(), calculate_checksum(&data));
    }

    #[test]
    fn test_format_checksum() {
        assert_eq!(format_checksum(0), *b"000");
        assert_eq!(format_checksum(7), *b"007");
        assert_eq!(format_checksum(42), *b"042");
        assert_eq!(format_checksum(100), *b"100");
        assert_eq!(format_checksum(255), *b"255");
    }

    #[test]
    fn test_checksum_field() {
        assert_eq!(&checksum_field(7), b"10=007\x01");
        assert_eq!(&checksum_field(120), b"10=120\x01");
    }

    #[test]
    fn test_parse_checksum() {
        assert_eq!(parse_checksum(b"000"), Some(0));
        assert_eq!(parse_checksum(b"042"), Some(42));
        assert_eq!(parse_checksum(b"100"), Some(100));
        assert_eq!(parse_checksum(b"255"), Some(255));
    }

    #[test]
    fn test_parse_checksum_invalid() {
        assert_eq!(parse_checksum(b""), None);
        assert_eq!(parse_checksum(b"00"), None);
        assert_eq!(parse_checksum(b"0000"), None);
        assert_eq!(parse_checksum(b"abc"), None);
        assert_eq!(parse_checksum(b"12X"), None);
        assert_eq!(parse_checksum(b"256"), None);
        assert_eq!(parse_checksum(b"999"), None);
    }

    #[test]
    fn test_roundtrip() {
        for i in 0..=255u8 {
            let formatted = format_checksum(i);
            let parsed = parse_checksum(&formatted);
            assert_eq!(parsed, Some(i));
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::{any, prop, prop_assert_eq, proptest};

        proptest! {
            /// Any split of a buffer sums to the checksum of the whole.
            #[test]
            fn prop_split_checksum_is_additive(
                data in prop::collection::vec(any::<u8>(), 0..512),
                split in any::<prop::sample::Index>(),
            ) {
                let at = split.index(data.len() + 1);
                let (a, b) = data.split_at(at);
                prop_assert_eq!(
                    calculate_checksum(a).wrapping_add(calculate_checksum(b)),
                    calculate_checksum(&data)
                );
            }

            /// Every strategy computes the scalar result.
            #[test]
            fn prop_strategies_agree(data in prop::collection::vec(any::<u8>(), 0..512)) {
                let expected = checksum_scalar(&data);
                for strategy in Strategy::ALL {
                    prop_assert_eq!(checksum_with(strategy, &data), expected);
                }
            }
        }
    }
}
