/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # FlashFix Transport
//!
//! Moving FlashFix messages over byte streams.
//!
//! This crate provides:
//! - **Codec**: Tokio codec that frames FIX 4.4 messages out of a TCP stream
//! - **Vectored writer**: scatter/gather writes of a framed message that
//!   resume after partial writes on non-blocking sockets

pub mod codec;
pub mod writer;

pub use codec::{CodecConfig, CodecError, DEFAULT_MAX_MESSAGE_SIZE, FixCodec};
pub use writer::{MAX_IO_SLICES, VectoredWriter, WriteProgress};
