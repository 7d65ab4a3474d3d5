/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Error types for the FlashFix codec.
//!
//! Every structural problem is reported synchronously through one of the
//! enums below. None of them is retried or repaired by the codec itself: a
//! caller receiving an error discards the attempt and starts over.

use crate::wire::MAX_BODY_LENGTH;
use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all FlashFix operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error during message deserialization.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error during message serialization.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Error reported by the vectored write path.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors that occur while deserializing a FIX message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// BeginString or BodyLength tag literal mismatch, or a missing
    /// delimiter after the BodyLength digits.
    #[error("invalid message: malformed BeginString or BodyLength field")]
    InvalidMessage,

    /// No checksum trailer (`10=XXX<SOH>`) was found in the buffer.
    #[error("incomplete message, checksum trailer not found")]
    Incomplete,

    /// Declared BodyLength differs from the distance to the checksum tag.
    #[error("body length mismatch: declared {declared}, actual {actual}")]
    BodyLengthMismatch {
        /// Value carried by tag 9.
        declared: usize,
        /// Byte distance from the end of tag 9 to the start of tag 10.
        actual: usize,
    },

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Checksum computed over the received bytes.
        calculated: u8,
        /// Checksum value carried by tag 10.
        declared: u16,
    },

    /// The body holds more fields than the message can store.
    #[error("too many fields: message capacity is {capacity}")]
    TooManyFields {
        /// Field capacity of the destination message.
        capacity: usize,
    },

    /// A body field has no separator, an empty tag, or an empty value.
    #[error("malformed field at body offset {offset}")]
    MalformedField {
        /// Offset of the offending field, relative to the start of the body.
        offset: usize,
    },
}

/// Errors that occur while serializing a FIX message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Destination buffer cannot hold the encoded message.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes needed to complete encoding.
        needed: usize,
        /// Bytes available in the destination.
        available: usize,
    },

    /// A field was pushed into a message that is already full.
    #[error("too many fields: message capacity is {capacity}")]
    TooManyFields {
        /// Field capacity of the message.
        capacity: usize,
    },

    /// The body cannot be announced in a five-digit BodyLength.
    #[error("body too large: {body_len} bytes, limit is {max}")]
    BodyTooLarge {
        /// Length of the body to frame.
        body_len: usize,
        /// Largest body a frame can carry.
        max: usize,
    },
}

impl EncodeError {
    /// Fails with `BodyTooLarge` if `body_len` exceeds [`MAX_BODY_LENGTH`].
    ///
    /// [`MAX_BODY_LENGTH`]: crate::wire::MAX_BODY_LENGTH
    #[inline]
    pub const fn check_body_len(body_len: usize) -> std::result::Result<(), Self> {
        if body_len > MAX_BODY_LENGTH {
            return Err(Self::BodyTooLarge {
                body_len,
                max: MAX_BODY_LENGTH,
            });
        }
        Ok(())
    }
}

/// Errors reported by the non-blocking vectored write path.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The writer cannot accept more bytes right now. Progress is kept,
    /// the caller retries once the socket is writable again.
    #[error("operation would block")]
    WouldBlock,

    /// Any other I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Returns true if the error only signals backpressure.
    #[inline]
    #[must_use]
    pub const fn is_would_block(&self) -> bool {
        matches!(self, Self::WouldBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::ChecksumMismatch {
            calculated: 100,
            declared: 200,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: calculated 100, declared 200"
        );

        let err = DecodeError::BodyLengthMismatch {
            declared: 12,
            actual: 11,
        };
        assert_eq!(err.to_string(), "body length mismatch: declared 12, actual 11");
    }

    #[test]
    fn test_encode_error_display() {
        let err = EncodeError::BufferTooSmall {
            needed: 64,
            available: 10,
        };
        assert_eq!(err.to_string(), "buffer too small: need 64 bytes, have 10");
    }

    #[test]
    fn test_check_body_len() {
        assert_eq!(EncodeError::check_body_len(0), Ok(()));
        assert_eq!(EncodeError::check_body_len(MAX_BODY_LENGTH), Ok(()));
        assert_eq!(
            EncodeError::check_body_len(MAX_BODY_LENGTH + 1),
            Err(EncodeError::BodyTooLarge {
                body_len: 100_000,
                max: 99_999
            })
        );
    }

    #[test]
    fn test_fix_error_from_decode() {
        let fix_err: FixError = DecodeError::Incomplete.into();
        assert!(matches!(fix_err, FixError::Decode(DecodeError::Incomplete)));
    }

    #[test]
    fn test_transport_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: TransportError = io.into();
        assert!(!err.is_would_block());
        assert!(TransportError::WouldBlock.is_would_block());

        let fix_err: FixError = err.into();
        assert!(matches!(fix_err, FixError::Transport(TransportError::Io(_))));
    }
}
