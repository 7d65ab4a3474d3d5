/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Byte-level constants of the FIX 4.4 tag=value wire format.
//!
//! A framed message looks like
//! `8=FIX.4.4<SOH>9=<len><SOH><body>10=<ddd><SOH>`.

/// SOH (Start of Header) delimiter terminating every field.
pub const SOH: u8 = 0x01;

/// Separator between tag and value.
pub const EQUALS: u8 = b'=';

/// Byte written over separators and delimiters by in-place tokenization.
pub const NUL: u8 = 0x00;

/// The only protocol version this codec speaks.
pub const FIX_VERSION: &[u8] = b"FIX.4.4";

/// BeginString field including its delimiter.
pub const BEGIN_STRING: &[u8] = b"8=FIX.4.4\x01";

/// BodyLength tag and separator.
pub const BODY_LENGTH_TAG: &[u8] = b"9=";

/// CheckSum tag and separator.
pub const CHECKSUM_TAG: &[u8] = b"10=";

/// Number of digits in the CheckSum value.
pub const CHECKSUM_DIGITS: usize = 3;

/// Length of the complete trailer `10=ddd<SOH>`.
pub const TRAILER_LEN: usize = CHECKSUM_TAG.len() + CHECKSUM_DIGITS + 1;

/// Most digits accepted in a BodyLength value.
pub const MAX_BODY_LENGTH_DIGITS: usize = 5;

/// Largest BodyLength that fits in [`MAX_BODY_LENGTH_DIGITS`] digits.
pub const MAX_BODY_LENGTH: usize = 99_999;

/// Shortest possible framed message: header with a one-digit length and an
/// empty body, followed by the trailer.
pub const MIN_MESSAGE_LEN: usize = BEGIN_STRING.len() + BODY_LENGTH_TAG.len() + 2 + TRAILER_LEN;

/// Default number of field slots in a [`Message`](crate::message::Message).
pub const DEFAULT_MAX_FIELDS: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(BEGIN_STRING.len(), 10);
        assert_eq!(TRAILER_LEN, 7);
        assert_eq!(MIN_MESSAGE_LEN, 21);
        assert_eq!(&BEGIN_STRING[2..9], FIX_VERSION);
    }
}
