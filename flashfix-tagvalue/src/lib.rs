/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # FlashFix Tag-Value
//!
//! Zero-copy FIX 4.4 tag=value serialization and deserialization.
//!
//! This crate turns a [`Message`] into wire bytes and back without touching
//! the heap. Outgoing messages are written into a caller buffer or exposed as
//! scatter/gather segments; incoming messages are validated and tokenized in
//! place inside the receive buffer.
//!
//! ## Features
//!
//! - **Zero-copy parsing**: Field values reference the original buffer
//! - **Runtime SIMD dispatch**: checksum and trailer search pick SSE2/AVX2
//!   when available, with identical results on every [`Strategy`]
//! - **Fail-fast validation**: BeginString, BodyLength and CheckSum are
//!   verified before the buffer is modified
//!
//! ## Example
//!
//! ```
//! use flashfix_core::Message;
//! use flashfix_tagvalue::{deserialize, framed_len, serialize_framed};
//!
//! let mut order: Message<'_, 8> = Message::new();
//! order.push(b"35", b"D").unwrap();
//! order.push(b"55", b"AAPL").unwrap();
//!
//! let mut wire = vec![0u8; framed_len(&order)];
//! serialize_framed(&order, &mut wire).unwrap();
//!
//! let mut decoded: Message<'_, 8> = Message::new();
//! deserialize(&mut wire, &mut decoded).unwrap();
//! assert_eq!(decoded.get_value(b"55"), Some(&b"AAPL"[..]));
//! ```
//!
//! [`Message`]: flashfix_core::Message

pub mod checksum;
pub mod decoder;
pub mod encoder;
pub mod integer;
pub mod simd;
pub mod tokenizer;
pub mod trailer;
pub mod vectored;

pub use checksum::{
    ChecksumAccumulator, calculate_checksum, checksum_field, checksum_with, format_checksum,
    parse_checksum,
};
pub use decoder::{Decoder, Header, deserialize, frame_len, is_complete, parse_header};
pub use encoder::{Encoder, finalize, framed_len, header_len, serialize, serialize_framed};
pub use integer::{decimal_len, format_unsigned, parse_unsigned};
pub use simd::Strategy;
pub use tokenizer::{count_fields, tokenize};
pub use trailer::{find_checksum_tag, find_checksum_tag_with};
pub use vectored::VectoredFrame;
