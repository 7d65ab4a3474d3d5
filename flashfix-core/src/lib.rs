/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # FlashFix Core
//!
//! Core types and error definitions for the FlashFix FIX 4.4 codec.
//!
//! This crate provides the building blocks shared by the other FlashFix crates:
//! - **Error types**: `DecodeError`, `EncodeError`, `TransportError` built with `thiserror`
//! - **Field type**: `Field`, a borrowed tag=value pair
//! - **Message type**: `Message<N>`, a fixed-capacity ordered field list
//! - **Wire constants**: delimiters, BeginString, trailer layout
//!
//! ## Zero-Copy Design
//!
//! Fields borrow their bytes, so the lifetime of a decoded message is tied to
//! the receive buffer and the lifetime of an outgoing message to its source
//! data. Nothing here allocates.

pub mod error;
pub mod field;
pub mod message;
pub mod wire;

pub use error::{DecodeError, EncodeError, FixError, Result, TransportError};
pub use field::Field;
pub use message::Message;
pub use wire::{DEFAULT_MAX_FIELDS, SOH};
