/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! FIX message serializer.
//!
//! This module writes a [`Message`] into a caller-provided buffer in the
//! standard tag=value format. Three entry points share the same layout:
//!
//! - [`serialize`] writes the raw body, one `tag=value<SOH>` per field
//! - [`serialize_framed`] writes the complete wire message
//! - [`finalize`] frames a body that was already written to the buffer
//!
//! Each computes the bytes it needs before writing, so a buffer that is too
//! small is reported without a single byte being modified.

use crate::checksum::{checksum_field, checksum_with};
use crate::integer::{decimal_len, format_unsigned};
use crate::simd::Strategy;
use flashfix_core::wire::{BEGIN_STRING, BODY_LENGTH_TAG, EQUALS, SOH, TRAILER_LEN};
use flashfix_core::{EncodeError, Message};

/// Length of `8=FIX.4.4<SOH>9=<body_len><SOH>`.
#[inline]
#[must_use]
pub const fn header_len(body_len: usize) -> usize {
    BEGIN_STRING.len() + BODY_LENGTH_TAG.len() + decimal_len(body_len as u64) + 1
}

/// Total wire length of `message` once framed.
#[inline]
#[must_use]
pub fn framed_len<const N: usize>(message: &Message<'_, N>) -> usize {
    let body_len = message.body_len();
    header_len(body_len) + body_len + TRAILER_LEN
}

/// FIX message serializer.
///
/// Carries the strategy used for the checksum. The free functions in this
/// module use [`Strategy::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
    strategy: Strategy,
}

impl Encoder {
    /// Creates an encoder using the widest strategy the CPU supports.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategy: Strategy::detect(),
        }
    }

    /// Creates an encoder with an explicit checksum strategy.
    ///
    /// # Arguments
    /// * `strategy` - Falls back to a narrower one if unsupported
    #[must_use]
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy: strategy.resolve(),
        }
    }

    /// Returns the checksum strategy in use.
    #[inline]
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Writes the raw body of `message` into `out`.
    ///
    /// # Returns
    /// The number of bytes written.
    ///
    /// # Errors
    /// Returns `EncodeError::BufferTooSmall` if `out` cannot hold the body.
    pub fn serialize<const N: usize>(
        &self,
        message: &Message<'_, N>,
        out: &mut [u8],
    ) -> Result<usize, EncodeError> {
        let needed = message.body_len();
        check_capacity(needed, out.len())?;
        Ok(write_body(message, out))
    }

    /// Writes the complete framed message into `out`.
    ///
    /// # Returns
    /// The number of bytes written, equal to [`framed_len`].
    ///
    /// # Errors
    /// - `EncodeError::BodyTooLarge` if the body exceeds a five-digit
    ///   BodyLength
    /// - `EncodeError::BufferTooSmall` if `out` cannot hold the message
    pub fn serialize_framed<const N: usize>(
        &self,
        message: &Message<'_, N>,
        out: &mut [u8],
    ) -> Result<usize, EncodeError> {
        let body_len = message.body_len();
        EncodeError::check_body_len(body_len)?;
        let header = header_len(body_len);
        check_capacity(header + body_len + TRAILER_LEN, out.len())?;

        write_header(body_len, out)?;
        let end = header + write_body(message, &mut out[header..]);
        Ok(self.write_trailer(out, end))
    }

    /// Frames a body already written at `out[..body_len]`.
    ///
    /// The body is shifted right to make room for the header, then the
    /// header and trailer are written around it.
    ///
    /// # Returns
    /// The total framed length.
    ///
    /// # Errors
    /// - `EncodeError::BufferTooSmall` if `out` cannot hold the framed
    ///   message, including a `body_len` past the end of `out`
    /// - `EncodeError::BodyTooLarge` if the body exceeds a five-digit
    ///   BodyLength
    pub fn finalize(&self, out: &mut [u8], body_len: usize) -> Result<usize, EncodeError> {
        if body_len > out.len() {
            return Err(EncodeError::BufferTooSmall {
                needed: header_len(body_len)
                    .saturating_add(body_len)
                    .saturating_add(TRAILER_LEN),
                available: out.len(),
            });
        }
        EncodeError::check_body_len(body_len)?;
        let header = header_len(body_len);
        check_capacity(header + body_len + TRAILER_LEN, out.len())?;

        out.copy_within(..body_len, header);
        write_header(body_len, out)?;
        Ok(self.write_trailer(out, header + body_len))
    }

    /// Appends `10=ddd<SOH>` at `end`, checksumming `out[..end]`.
    #[inline]
    fn write_trailer(&self, out: &mut [u8], end: usize) -> usize {
        let checksum = checksum_with(self.strategy, &out[..end]);
        out[end..end + TRAILER_LEN].copy_from_slice(&checksum_field(checksum));
        end + TRAILER_LEN
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the raw body of `message` into `out`.
///
/// # Errors
/// Returns `EncodeError::BufferTooSmall` if `out` cannot hold the body.
///
/// # Example
/// ```
/// use flashfix_core::Message;
/// use flashfix_tagvalue::serialize;
///
/// let mut msg: Message<'_, 4> = Message::new();
/// msg.push(b"6", b"123").unwrap();
///
/// let mut out = [0u8; 16];
/// let n = serialize(&msg, &mut out).unwrap();
/// assert_eq!(&out[..n], b"6=123\x01");
/// ```
#[inline]
pub fn serialize<const N: usize>(
    message: &Message<'_, N>,
    out: &mut [u8],
) -> Result<usize, EncodeError> {
    Encoder::new().serialize(message, out)
}

/// Writes the complete framed message into `out`.
///
/// # Errors
/// See [`Encoder::serialize_framed`].
#[inline]
pub fn serialize_framed<const N: usize>(
    message: &Message<'_, N>,
    out: &mut [u8],
) -> Result<usize, EncodeError> {
    Encoder::new().serialize_framed(message, out)
}

/// Frames a body already written at `out[..body_len]`.
///
/// # Errors
/// See [`Encoder::finalize`].
#[inline]
pub fn finalize(out: &mut [u8], body_len: usize) -> Result<usize, EncodeError> {
    Encoder::new().finalize(out, body_len)
}

#[inline]
fn check_capacity(needed: usize, available: usize) -> Result<(), EncodeError> {
    if needed > available {
        return Err(EncodeError::BufferTooSmall { needed, available });
    }
    Ok(())
}

/// Copies `src` to `out[pos..]` and returns the new position.
#[inline(always)]
fn put(out: &mut [u8], pos: usize, src: &[u8]) -> usize {
    let end = pos + src.len();
    out[pos..end].copy_from_slice(src);
    end
}

/// Caller guarantees `out` holds the whole body.
fn write_body<const N: usize>(message: &Message<'_, N>, out: &mut [u8]) -> usize {
    let mut pos = 0;
    for field in message {
        pos = put(out, pos, field.tag);
        out[pos] = EQUALS;
        pos = put(out, pos + 1, field.value);
        out[pos] = SOH;
        pos += 1;
    }
    pos
}

fn write_header(body_len: usize, out: &mut [u8]) -> Result<usize, EncodeError> {
    let mut pos = put(out, 0, BEGIN_STRING);
    pos = put(out, pos, BODY_LENGTH_TAG);
    pos += format_unsigned(body_len as u64, &mut out[pos..])?;
    out[pos] = SOH;
    Ok(pos + 1)
}
