/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Tokio codec for FIX message framing.
//!
//! This module provides a codec that cuts a TCP byte stream into complete
//! FIX 4.4 messages. The header is validated as soon as it arrives, the
//! frame length is taken from BodyLength, and each finished frame has its
//! trailer position and checksum verified before it is handed out.
//!
//! Frames are yielded as [`BytesMut`] so the caller can deserialize them in
//! place with [`flashfix_tagvalue::deserialize`].

use bytes::{BufMut, BytesMut};
use flashfix_core::wire::{CHECKSUM_DIGITS, CHECKSUM_TAG, TRAILER_LEN};
use flashfix_core::{DecodeError, EncodeError, Message};
use flashfix_tagvalue::{
    Decoder as FrameDecoder, Encoder as FrameEncoder, Strategy, checksum_with,
    find_checksum_tag_with, framed_len, parse_header, parse_unsigned,
};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

/// Default upper bound for a single framed message.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Errors that can occur during codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Header, body length or checksum rejected.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Outgoing message could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Message exceeds maximum size.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// The bytes where BodyLength places the trailer are not `10=ddd<SOH>`.
    #[error("checksum trailer not found at offset {offset}")]
    MissingTrailer {
        /// Offset where the trailer was expected.
        offset: usize,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Codec settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum framed message size in bytes.
    pub max_message_size: usize,
    /// Whether to validate checksums of incoming frames.
    pub validate_checksum: bool,
    /// Strategy used by the trailer locator and checksum.
    pub strategy: Strategy,
}

impl CodecConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            validate_checksum: true,
            strategy: Strategy::detect(),
        }
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets whether to validate checksums.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Sets the scan strategy. Unsupported strategies fall back to a
    /// narrower one.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy.resolve();
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokio codec for FIX message framing.
///
/// Handles parsing of FIX messages from a byte stream, validating
/// BeginString, BodyLength, the trailer position and optionally Checksum.
#[derive(Debug, Clone)]
pub struct FixCodec {
    config: CodecConfig,
    encoder: FrameEncoder,
}

impl FixCodec {
    /// Creates a new codec with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Creates a codec from an explicit configuration.
    #[must_use]
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            encoder: FrameEncoder::with_strategy(config.strategy),
            config,
        }
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Sets whether to validate checksums.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.config.validate_checksum = validate;
        self
    }

    /// Returns the active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Returns a deserializer that matches this codec's strategy.
    #[inline]
    #[must_use]
    pub fn frame_decoder(&self) -> FrameDecoder {
        FrameDecoder::with_strategy(self.config.strategy)
    }

    fn check_size(&self, size: usize) -> Result<(), CodecError> {
        if size > self.config.max_message_size {
            debug!(size, max = self.config.max_message_size, "rejecting oversized FIX frame");
            return Err(CodecError::MessageTooLarge {
                size,
                max_size: self.config.max_message_size,
            });
        }
        Ok(())
    }

    /// Verifies the trailer of a complete frame.
    fn check_trailer(&self, frame: &[u8]) -> Result<(), CodecError> {
        let strategy = self.config.strategy;
        let trailer = frame.len() - TRAILER_LEN;
        if find_checksum_tag_with(strategy, &frame[trailer..]) != Some(0) {
            debug!(offset = trailer, "FIX frame has no trailer where BodyLength points");
            return Err(CodecError::MissingTrailer { offset: trailer });
        }

        if self.config.validate_checksum {
            let calculated = checksum_with(strategy, &frame[..trailer]);
            let digits = trailer + CHECKSUM_TAG.len();
            let (declared, _) = parse_unsigned(&frame[digits..digits + CHECKSUM_DIGITS]);
            let declared = declared as u16;
            if u16::from(calculated) != declared {
                debug!(calculated, declared, "FIX frame checksum mismatch");
                return Err(DecodeError::ChecksumMismatch {
                    calculated,
                    declared,
                }
                .into());
            }
        }
        Ok(())
    }
}

impl Default for FixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FixCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let header = match parse_header(src) {
            Ok(Some(header)) => header,
            Ok(None) => return Ok(None),
            Err(err) => {
                debug!(error = %err, "rejecting FIX frame header");
                return Err(err.into());
            }
        };

        let total_length = header.frame_len();
        self.check_size(total_length)?;

        // Check if we have the complete message
        if src.len() < total_length {
            src.reserve(total_length - src.len());
            return Ok(None);
        }

        self.check_trailer(&src[..total_length])?;
        Ok(Some(src.split_to(total_length)))
    }
}

impl<const N: usize> Encoder<&Message<'_, N>> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &Message<'_, N>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let len = framed_len(item);
        self.check_size(len)?;

        let start = dst.len();
        dst.resize(start + len, 0);
        if let Err(err) = self.encoder.serialize_framed(item, &mut dst[start..]) {
            dst.truncate(start);
            return Err(err.into());
        }
        Ok(())
    }
}

impl Encoder<&[u8]> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.check_size(item.len())?;
        dst.reserve(item.len());
        dst.put_slice(item);
        Ok(())
    }
}

impl Encoder<BytesMut> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.check_size(item.len())?;
        dst.reserve(item.len());
        dst.put_slice(&item);
        Ok(())
    }
}
