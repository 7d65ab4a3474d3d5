/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # FlashFix
//!
//! A zero-copy FIX 4.4 tag=value codec for Rust.
//!
//! FlashFix serializes fixed-capacity messages into caller buffers and
//! deserializes them back in place, validating BeginString, BodyLength and
//! CheckSum on the way. Checksum and trailer search are dispatched at runtime
//! to SSE2 or AVX2 when the CPU has them.
//!
//! ## Features
//!
//! - **Zero-copy parsing**: Field values reference the original buffer
//! - **No heap on the hot path**: messages hold up to `N` fields inline
//! - **Runtime SIMD dispatch**: identical results on every strategy
//! - **Async support**: Tokio codec and resumable vectored writes
//!
//! ## Quick Start
//!
//! ```rust
//! use flashfix::prelude::*;
//!
//! let mut order: Message<'_, 16> = Message::new();
//! order.push(b"35", b"D").unwrap();
//! order.push(b"55", b"AAPL").unwrap();
//! order.push(b"38", b"100").unwrap();
//!
//! let mut wire = [0u8; 128];
//! let len = serialize_framed(&order, &mut wire).unwrap();
//!
//! let mut decoded: Message<'_, 16> = Message::new();
//! let consumed = deserialize(&mut wire[..len], &mut decoded).unwrap();
//! assert_eq!(consumed, len);
//! assert_eq!(decoded.get_value(b"38"), Some(&b"100"[..]));
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Field and message types, wire constants, error definitions
//! - [`tagvalue`]: Serializer, deserializer, checksum and trailer search
//! - [`transport`]: Tokio codec and vectored writer

pub mod core {
    //! Field and message types, wire constants, error definitions.
    pub use flashfix_core::*;
}

pub mod tagvalue {
    //! Zero-copy tag=value serialization and deserialization.
    pub use flashfix_tagvalue::*;
}

pub mod transport {
    //! Stream framing and vectored writes.
    pub use flashfix_transport::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use flashfix_core::{
        DecodeError, EncodeError, Field, FixError, Message, Result, SOH, TransportError,
    };

    // Tag-value encoding
    pub use flashfix_tagvalue::{
        Decoder, Encoder, Strategy, VectoredFrame, calculate_checksum, deserialize, framed_len,
        is_complete, serialize, serialize_framed,
    };

    // Transport
    pub use flashfix_transport::{CodecConfig, CodecError, FixCodec, VectoredWriter, WriteProgress};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let mut msg: Message<'_, 4> = Message::new();
        msg.push(b"35", b"0").unwrap();

        let mut wire = [0u8; 64];
        let len = serialize_framed(&msg, &mut wire).unwrap();
        assert!(is_complete(&wire, len));
        assert_eq!(VectoredFrame::new(&msg).unwrap().len(), len);
    }

    #[test]
    fn test_errors_convert_to_fix_error() {
        fn decode(buffer: &mut [u8]) -> Result<usize> {
            let mut msg: Message<'_, 4> = Message::new();
            Ok(deserialize(buffer, &mut msg)?)
        }

        let mut garbage = *b"GET / HTTP/1.1\r\n\r\n\r\n";
        assert!(matches!(
            decode(&mut garbage),
            Err(FixError::Decode(DecodeError::InvalidMessage))
        ));
    }
}
