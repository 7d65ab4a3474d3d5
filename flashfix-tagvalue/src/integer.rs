/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Decimal integer codec for numeric field values.

use flashfix_core::EncodeError;

/// Parses an unsigned decimal integer from the start of `bytes`.
///
/// Parsing stops at the first non-digit. Leading whitespace is not skipped
/// and overflow wraps; callers bound the input length.
///
/// # Returns
/// `(value, consumed)`. `consumed == 0` means `bytes` does not start with a
/// digit and `value` is 0.
#[inline]
#[must_use]
pub fn parse_unsigned(bytes: &[u8]) -> (u64, usize) {
    let mut value: u64 = 0;
    let mut consumed = 0;

    for &b in bytes {
        let digit = b.wrapping_sub(b'0');
        if digit > 9 {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add(u64::from(digit));
        consumed += 1;
    }

    (value, consumed)
}

/// Returns the number of decimal digits needed to print `value`.
#[inline]
#[must_use]
pub const fn decimal_len(value: u64) -> usize {
    match value.checked_ilog10() {
        Some(log) => log as usize + 1,
        None => 1,
    }
}

/// Writes `value` as decimal digits into the start of `out`.
///
/// Most significant digit first, no leading zeros, `0` prints as `"0"`.
///
/// # Errors
/// Returns `EncodeError::BufferTooSmall` if `out` is shorter than
/// [`decimal_len`]`(value)`; nothing is written in that case.
#[inline]
pub fn format_unsigned(value: u64, out: &mut [u8]) -> Result<usize, EncodeError> {
    let mut buffer = itoa::Buffer::new();
    let digits = buffer.format(value).as_bytes();
    let available = out.len();

    let dest = out
        .get_mut(..digits.len())
        .ok_or(EncodeError::BufferTooSmall {
            needed: digits.len(),
            available,
        })?;
    dest.copy_from_slice(digits);
    Ok(digits.len())
}
