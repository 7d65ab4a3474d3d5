/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Zero-copy FIX message deserializer.
//!
//! Deserialization runs as a fixed sequence of checks over the receive
//! buffer:
//!
//! 1. BeginString must be `8=FIX.4.4<SOH>`
//! 2. BodyLength tag `9=` must follow
//! 3. BodyLength holds 1 to 5 digits terminated by SOH
//! 4. The checksum trailer is located after the header
//! 5. The distance from header to trailer must equal BodyLength
//! 6. The checksum of everything before the trailer must match
//! 7. The body is tokenized in place into the caller's [`Message`]
//!
//! The first failing check ends deserialization. Only step 7 writes to the
//! buffer, and only once the whole body is known to be well formed.

use crate::checksum::checksum_with;
use crate::integer::parse_unsigned;
use crate::simd::Strategy;
use crate::tokenizer::tokenize;
use crate::trailer::find_checksum_tag_with;
use flashfix_core::wire::{
    BEGIN_STRING, BODY_LENGTH_TAG, CHECKSUM_DIGITS, CHECKSUM_TAG, MAX_BODY_LENGTH_DIGITS,
    MIN_MESSAGE_LEN, SOH, TRAILER_LEN,
};
use flashfix_core::{DecodeError, Message};

/// Result of parsing `8=FIX.4.4<SOH>9=<len><SOH>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Offset of the first body byte.
    pub body_start: usize,
    /// Declared BodyLength.
    pub body_len: usize,
}

impl Header {
    /// Total length of the framed message this header announces.
    #[inline]
    #[must_use]
    pub const fn frame_len(&self) -> usize {
        self.body_start + self.body_len + TRAILER_LEN
    }
}

/// Parses the header at the start of `buffer`.
///
/// # Returns
/// - `Ok(Some(header))` once BeginString, `9=`, the digits and their SOH
///   are all present and valid
/// - `Ok(None)` while `buffer` is a valid but unfinished header prefix
///
/// # Errors
/// Returns `DecodeError::InvalidMessage` as soon as a byte contradicts the
/// header layout.
pub fn parse_header(buffer: &[u8]) -> Result<Option<Header>, DecodeError> {
    let mut pos = 0;
    for literal in [BEGIN_STRING, BODY_LENGTH_TAG] {
        let available = &buffer[pos.min(buffer.len())..];
        let n = available.len().min(literal.len());
        if available[..n] != literal[..n] {
            return Err(DecodeError::InvalidMessage);
        }
        if n < literal.len() {
            return Ok(None);
        }
        pos += literal.len();
    }

    let digits_end = buffer.len().min(pos + MAX_BODY_LENGTH_DIGITS);
    let (body_len, consumed) = parse_unsigned(&buffer[pos..digits_end]);
    pos += consumed;

    match buffer.get(pos) {
        None => Ok(None),
        Some(_) if consumed == 0 => Err(DecodeError::InvalidMessage),
        Some(&SOH) => Ok(Some(Header {
            body_start: pos + 1,
            body_len: body_len as usize,
        })),
        Some(_) => Err(DecodeError::InvalidMessage),
    }
}

/// Zero-copy FIX message deserializer.
///
/// Carries the strategy used by the trailer locator and the checksum. The
/// free functions in this module use [`Strategy::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    strategy: Strategy,
}

impl Decoder {
    /// Creates a decoder using the widest strategy the CPU supports.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategy: Strategy::detect(),
        }
    }

    /// Creates a decoder with an explicit strategy.
    ///
    /// # Arguments
    /// * `strategy` - Falls back to a narrower one if unsupported
    #[must_use]
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy: strategy.resolve(),
        }
    }

    /// Returns the strategy in use.
    #[inline]
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Deserializes the message at the start of `buffer` into `message`.
    ///
    /// On success every field of `message` borrows `buffer`, whose body
    /// delimiters have been replaced by NUL bytes. Bytes after the trailer
    /// are not inspected.
    ///
    /// # Returns
    /// The number of bytes consumed, trailer included.
    ///
    /// # Errors
    /// - `DecodeError::InvalidMessage` for a malformed header
    /// - `DecodeError::Incomplete` if the header or the trailer is missing
    /// - `DecodeError::BodyLengthMismatch` if the trailer is not where
    ///   BodyLength puts it
    /// - `DecodeError::ChecksumMismatch` if the checksum does not match
    /// - `DecodeError::TooManyFields` or `DecodeError::MalformedField` from
    ///   the tokenizer
    ///
    /// On error `message` is empty.
    pub fn deserialize<'a, const N: usize>(
        &self,
        buffer: &'a mut [u8],
        message: &mut Message<'a, N>,
    ) -> Result<usize, DecodeError> {
        message.clear();

        let header = parse_header(buffer)?.ok_or(DecodeError::Incomplete)?;
        let body_start = header.body_start;

        let trailer = find_checksum_tag_with(self.strategy, &buffer[body_start..])
            .map(|offset| body_start + offset)
            .ok_or(DecodeError::Incomplete)?;

        let actual = trailer - body_start;
        if actual != header.body_len {
            return Err(DecodeError::BodyLengthMismatch {
                declared: header.body_len,
                actual,
            });
        }

        let calculated = checksum_with(self.strategy, &buffer[..trailer]);
        let digits_start = trailer + CHECKSUM_TAG.len();
        let (declared, _) = parse_unsigned(&buffer[digits_start..digits_start + CHECKSUM_DIGITS]);
        let declared = declared as u16;
        if u16::from(calculated) != declared {
            return Err(DecodeError::ChecksumMismatch {
                calculated,
                declared,
            });
        }

        let consumed = trailer + TRAILER_LEN;
        tokenize(&mut buffer[body_start..trailer], message)?;
        Ok(consumed)
    }

    /// Returns true if `buffer[..message_len]` holds a checksum trailer.
    ///
    /// `message_len` is clamped to the buffer length. Nothing else about the
    /// message is validated.
    #[must_use]
    pub fn is_complete(&self, buffer: &[u8], message_len: usize) -> bool {
        let len = message_len.min(buffer.len());
        if len < MIN_MESSAGE_LEN {
            return false;
        }
        find_checksum_tag_with(self.strategy, &buffer[BEGIN_STRING.len()..len]).is_some()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserializes the message at the start of `buffer` into `message`.
///
/// # Errors
/// See [`Decoder::deserialize`].
///
/// # Example
/// ```
/// use flashfix_core::Message;
/// use flashfix_tagvalue::deserialize;
///
/// let mut buffer = *b"8=FIX.4.4\x019=5\x0135=0\x0110=163\x01";
/// let mut msg: Message<'_, 8> = Message::new();
///
/// let consumed = deserialize(&mut buffer, &mut msg).unwrap();
/// assert_eq!(consumed, 26);
/// assert_eq!(msg.get_value(b"35"), Some(&b"0"[..]));
/// ```
#[inline]
pub fn deserialize<'a, const N: usize>(
    buffer: &'a mut [u8],
    message: &mut Message<'a, N>,
) -> Result<usize, DecodeError> {
    Decoder::new().deserialize(buffer, message)
}

/// Returns true if `buffer[..message_len]` holds a checksum trailer.
#[inline]
#[must_use]
pub fn is_complete(buffer: &[u8], message_len: usize) -> bool {
    Decoder::new().is_complete(buffer, message_len)
}

/// Returns the total length of the frame starting at `buffer[0]`, once its
/// header can be read.
///
/// # Errors
/// Returns `DecodeError::InvalidMessage` if the header is malformed.
#[inline]
pub fn frame_len(buffer: &[u8]) -> Result<Option<usize>, DecodeError> {
    Ok(parse_header(buffer)?.map(|header| header.frame_len()))
}
