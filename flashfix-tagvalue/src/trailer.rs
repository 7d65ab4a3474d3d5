/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Checksum trailer locator.
//!
//! Finds the first `10=ddd<SOH>` sequence in a byte range. A match that is
//! not at the very start of the range must follow a SOH, otherwise the tail
//! of a tag such as `110=` could be taken for the trailer.
//!
//! The vector strategies build one bitmask per byte class (`1`, `0`, `=`,
//! digit, SOH), shift each by its offset inside the pattern and AND them
//! together. Only candidates whose whole 7-byte window lies inside the loaded
//! vector are kept; the scalar loop finishes whatever is left.

use crate::simd::Strategy;
use flashfix_core::wire::{SOH, TRAILER_LEN};

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Finds the index of the checksum trailer using the detected strategy.
///
/// # Returns
/// The index of the `1` in `10=`, or `None` if no complete trailer lies
/// inside `data`. Bytes past the end of `data` are never read.
#[inline]
#[must_use]
pub fn find_checksum_tag(data: &[u8]) -> Option<usize> {
    find_checksum_tag_with(Strategy::detect(), data)
}

/// Finds the index of the checksum trailer with an explicit strategy.
#[must_use]
pub fn find_checksum_tag_with(strategy: Strategy, data: &[u8]) -> Option<usize> {
    match strategy.resolve() {
        Strategy::Scalar => find_scalar(data, 0),
        Strategy::Word => find_word(data),
        // SAFETY: SSE2 is part of the x86_64 baseline.
        #[cfg(target_arch = "x86_64")]
        Strategy::Sse2 => unsafe { find_sse2(data) },
        // SAFETY: `resolve` only yields Avx2 when the CPU reports it.
        #[cfg(target_arch = "x86_64")]
        Strategy::Avx2 => unsafe { find_avx2(data) },
        #[cfg(not(target_arch = "x86_64"))]
        Strategy::Sse2 | Strategy::Avx2 => find_word(data),
    }
}

#[inline(always)]
fn follows_boundary(data: &[u8], pos: usize) -> bool {
    pos == 0 || data[pos - 1] == SOH
}

/// Full check of the 7-byte window starting at `pos`.
#[inline(always)]
fn is_trailer_at(data: &[u8], pos: usize) -> bool {
    let Some(window) = data.get(pos..pos + TRAILER_LEN) else {
        return false;
    };
    window[0] == b'1'
        && window[1] == b'0'
        && window[2] == b'='
        && window[3].is_ascii_digit()
        && window[4].is_ascii_digit()
        && window[5].is_ascii_digit()
        && window[6] == SOH
        && follows_boundary(data, pos)
}

fn find_scalar(data: &[u8], start: usize) -> Option<usize> {
    let last = data.len().checked_sub(TRAILER_LEN)?;
    (start..=last).find(|&pos| is_trailer_at(data, pos))
}

/// Flags every zero byte of `word` with its high bit. Exact, no false
/// positives from borrows.
#[inline(always)]
const fn zero_bytes(word: u64) -> u64 {
    const LOW7: u64 = 0x7F7F_7F7F_7F7F_7F7F;
    !(((word & LOW7).wrapping_add(LOW7)) | word | LOW7)
}

/// Finds `1` candidates eight bytes at a time and verifies each in order.
fn find_word(data: &[u8]) -> Option<usize> {
    const ONES: u64 = 0x3131_3131_3131_3131;

    let mut i = 0;
    while i + 8 <= data.len() {
        let mut word = [0u8; 8];
        word.copy_from_slice(&data[i..i + 8]);
        let mut candidates = zero_bytes(u64::from_le_bytes(word) ^ ONES);

        while candidates != 0 {
            let pos = i + (candidates.trailing_zeros() / 8) as usize;
            if is_trailer_at(data, pos) {
                return Some(pos);
            }
            candidates &= candidates - 1;
        }
        i += 8;
    }

    find_scalar(data, i)
}

/// Positions 0..=9 of a 16-byte vector can hold a whole trailer.
#[cfg(target_arch = "x86_64")]
const SSE2_WINDOWS: usize = 16 - TRAILER_LEN + 1;

/// Positions 0..=25 of a 32-byte vector can hold a whole trailer.
#[cfg(target_arch = "x86_64")]
const AVX2_WINDOWS: usize = 32 - TRAILER_LEN + 1;

#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn combine(ones: u32, zeros: u32, equals: u32, digits: u32, soh: u32, windows: usize) -> u32 {
    let mask = ones
        & (zeros >> 1)
        & (equals >> 2)
        & (digits >> 3)
        & (digits >> 4)
        & (digits >> 5)
        & (soh >> 6);
    mask & ((1u32 << windows) - 1)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn find_sse2(data: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i + 16 <= data.len() {
        let mask = unsafe {
            let vec = _mm_loadu_si128(data[i..].as_ptr().cast());
            let ones = _mm_movemask_epi8(_mm_cmpeq_epi8(vec, _mm_set1_epi8(b'1' as i8)));
            let zeros = _mm_movemask_epi8(_mm_cmpeq_epi8(vec, _mm_set1_epi8(b'0' as i8)));
            let equals = _mm_movemask_epi8(_mm_cmpeq_epi8(vec, _mm_set1_epi8(b'=' as i8)));
            let soh = _mm_movemask_epi8(_mm_cmpeq_epi8(vec, _mm_set1_epi8(SOH as i8)));
            let digits = _mm_movemask_epi8(_mm_and_si128(
                _mm_cmpgt_epi8(vec, _mm_set1_epi8((b'0' - 1) as i8)),
                _mm_cmplt_epi8(vec, _mm_set1_epi8((b'9' + 1) as i8)),
            ));
            combine(
                ones as u32,
                zeros as u32,
                equals as u32,
                digits as u32,
                soh as u32,
                SSE2_WINDOWS,
            )
        };

        let mut candidates = mask;
        while candidates != 0 {
            let pos = i + candidates.trailing_zeros() as usize;
            if follows_boundary(data, pos) {
                return Some(pos);
            }
            candidates &= candidates - 1;
        }
        i += SSE2_WINDOWS;
    }

    find_scalar(data, i)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn find_avx2(data: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i + 32 <= data.len() {
        let mask = unsafe {
            let vec = _mm256_loadu_si256(data[i..].as_ptr().cast());
            let ones = _mm256_movemask_epi8(_mm256_cmpeq_epi8(vec, _mm256_set1_epi8(b'1' as i8)));
            let zeros = _mm256_movemask_epi8(_mm256_cmpeq_epi8(vec, _mm256_set1_epi8(b'0' as i8)));
            let equals =
                _mm256_movemask_epi8(_mm256_cmpeq_epi8(vec, _mm256_set1_epi8(b'=' as i8)));
            let soh = _mm256_movemask_epi8(_mm256_cmpeq_epi8(vec, _mm256_set1_epi8(SOH as i8)));
            // No cmplt for 256-bit bytes; swap operands of cmpgt instead.
            let digits = _mm256_movemask_epi8(_mm256_and_si256(
                _mm256_cmpgt_epi8(vec, _mm256_set1_epi8((b'0' - 1) as i8)),
                _mm256_cmpgt_epi8(_mm256_set1_epi8((b'9' + 1) as i8), vec),
            ));
            combine(
                ones as u32,
                zeros as u32,
                equals as u32,
                digits as u32,
                soh as u32,
                AVX2_WINDOWS,
            )
        };

        let mut candidates = mask;
        while candidates != 0 {
            let pos = i + candidates.trailing_zeros() as usize;
            if follows_boundary(data, pos) {
                return Some(pos);
            }
            candidates &= candidates - 1;
        }
        i += AVX2_WINDOWS;
    }

    find_scalar(data, i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_all(data: &[u8]) -> Vec<Option<usize>> {
        Strategy::ALL
            .iter()
            .map(|&s| find_checksum_tag_with(s, data))
            .collect()
    }

    fn assert_all(data: &[u8], expected: Option<usize>) {
        for strategy in Strategy::ALL {
            assert_eq!(
                find_checksum_tag_with(strategy, data),
                expected,
                "strategy {strategy}"
            );
        }
    }

    #[test]
    fn test_find_at_start() {
        assert_all(b"10=123\x01", Some(0));
    }

    #[test]
    fn test_find_after_body() {
        let data = b"35=D\x0155=AAPL\x0110=042\x01";
        assert_all(data, Some(13));
    }

    #[test]
    fn test_find_in_full_message() {
        let data = b"8=FIX.4.4\x019=5\x0135=0\x0110=163\x01";
        assert_all(data, Some(19));
    }

    #[test]
    fn test_truncated_trailer_not_found() {
        assert_all(b"35=D\x0110=1", None);
        assert_all(b"35=D\x0110=12", None);
        assert_all(b"35=D\x0110=123", None);
        assert_all(b"", None);
        assert_all(b"10=12\x01", None);
    }

    #[test]
    fn test_non_digit_checksum_rejected() {
        assert_all(b"35=D\x0110=1a3\x01", None);
        assert_all(b"35=D\x0110=123X", None);
    }

    #[test]
    fn test_suffix_of_longer_tag_ignored() {
        // 110= and 210= end in "10=ddd<SOH>" but are not the trailer.
        assert_all(b"35=D\x01110=123\x0155=X\x01", None);
        assert_all(b"35=D\x01210=999\x0110=007\x01", Some(13));
    }

    #[test]
    fn test_first_of_several() {
        let data = b"10=001\x0110=002\x01";
        assert_all(data, Some(0));
    }

    #[test]
    fn test_match_at_every_offset() {
        // Slide a trailer across vector boundaries of every width.
        for prefix in 0..80 {
            let mut data = vec![b'x'; prefix];
            if prefix > 0 {
                data[prefix - 1] = SOH;
            }
            data.extend_from_slice(b"10=200\x01");
            data.extend_from_slice(b"yyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyy");
            assert_all(&data, Some(prefix));
        }
    }

    #[test]
    fn test_strategies_agree_on_noise() {
        let mut data = Vec::new();
        for i in 0..400u32 {
            let b = match i % 13 {
                0 => b'1',
                1 => b'0',
                2 => b'=',
                5 => SOH,
                _ => b'0' + (i % 10) as u8,
            };
            data.push(b);
        }
        let results = find_all(&data);
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(results[0], find_scalar(&data, 0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::{prop, prop_assert_eq, proptest};

        proptest! {
            /// Every strategy agrees with the scalar locator on arbitrary
            /// bytes drawn from the pattern's alphabet.
            #[test]
            fn prop_strategies_agree(
                data in prop::collection::vec(
                    prop::sample::select(vec![b'1', b'0', b'=', b'5', SOH, b'A']),
                    0..300,
                )
            ) {
                let expected = find_scalar(&data, 0);
                for strategy in Strategy::ALL {
                    prop_assert_eq!(find_checksum_tag_with(strategy, &data), expected);
                }
            }
        }
    }
}
