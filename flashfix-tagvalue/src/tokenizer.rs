/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! In-place body tokenizer.
//!
//! Splits a message body into tag/value slices that borrow the body itself.
//! Each split `=` and each SOH is overwritten with a NUL byte, so a value
//! can also be handed to code expecting NUL-terminated strings.
//!
//! The body is validated in full before the first byte is touched. A body
//! that fails validation is left exactly as it was received.

use flashfix_core::wire::{EQUALS, NUL, SOH};
use flashfix_core::{DecodeError, Message};
use memchr::memchr;

/// Counts the fields of `body` without modifying it.
///
/// # Errors
/// Returns `DecodeError::MalformedField` with the body offset of the first
/// field that is not terminated by SOH, has no `=`, has an empty tag or an
/// empty value, or whose separator is followed by another `=`.
pub fn count_fields(body: &[u8]) -> Result<usize, DecodeError> {
    let mut offset = 0;
    let mut count = 0;

    while offset < body.len() {
        let rest = &body[offset..];
        let malformed = DecodeError::MalformedField { offset };

        let end = memchr(SOH, rest).ok_or(malformed)?;
        let field = &rest[..end];
        let eq = memchr(EQUALS, field).ok_or(malformed)?;
        if eq == 0 || eq + 1 == field.len() || field[eq + 1] == EQUALS {
            return Err(malformed);
        }

        count += 1;
        offset += end + 1;
    }

    Ok(count)
}

/// Tokenizes `body` into `message`, in place.
///
/// The message is cleared first. Values may contain further `=` bytes
/// after their first byte; the first `=` of each field separates tag from
/// value.
///
/// # Returns
/// The number of fields stored.
///
/// # Errors
/// - `DecodeError::MalformedField` as reported by [`count_fields`]
/// - `DecodeError::TooManyFields` if the body holds more than `N` fields
///
/// On error the message is empty and `body` is unchanged.
pub fn tokenize<'a, const N: usize>(
    body: &'a mut [u8],
    message: &mut Message<'a, N>,
) -> Result<usize, DecodeError> {
    message.clear();

    let count = count_fields(body)?;
    if count > N {
        return Err(DecodeError::TooManyFields { capacity: N });
    }

    let mut rest: &'a mut [u8] = body;
    while !rest.is_empty() {
        let remaining = std::mem::take(&mut rest);
        let end = memchr(SOH, remaining).unwrap_or(remaining.len());
        let (field, tail) = remaining.split_at_mut(end);
        rest = terminate(tail);

        let eq = memchr(EQUALS, field).unwrap_or(field.len());
        let (tag, value) = field.split_at_mut(eq);
        let value = terminate(value);

        if message.push(tag, value).is_err() {
            message.clear();
            return Err(DecodeError::TooManyFields { capacity: N });
        }
    }

    Ok(count)
}

/// Overwrites the leading delimiter of `slice` with NUL and returns what
/// follows it.
#[inline(always)]
fn terminate(slice: &mut [u8]) -> &mut [u8] {
    if slice.is_empty() {
        return slice;
    }
    let (delimiter, rest) = slice.split_at_mut(1);
    delimiter[0] = NUL;
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_fields() {
        let mut body = b"35=D\x0155=AAPL\x0138=100\x01".to_vec();
        let mut msg: Message<'_, 8> = Message::new();

        assert_eq!(tokenize(&mut body, &mut msg).unwrap(), 3);
        assert_eq!(msg.len(), 3);
        assert_eq!(msg.fields()[0].tag, b"35");
        assert_eq!(msg.fields()[0].value, b"D");
        assert_eq!(msg.fields()[1].value, b"AAPL");
        assert_eq!(msg.fields()[2].tag, b"38");
        assert_eq!(msg.fields()[2].value, b"100");
    }

    #[test]
    fn test_tokenize_writes_terminators() {
        let mut body = b"6=123\x0135=D\x01".to_vec();
        {
            let mut msg: Message<'_, 4> = Message::new();
            tokenize(&mut body, &mut msg).unwrap();
        }
        assert_eq!(body, b"6\x00123\x0035\x00D\x00");
    }

    #[test]
    fn test_tokenize_value_with_equals() {
        let mut body = b"58=a=b=c\x01".to_vec();
        let mut msg: Message<'_, 4> = Message::new();
        tokenize(&mut body, &mut msg).unwrap();
        assert_eq!(msg.fields()[0].tag, b"58");
        assert_eq!(msg.fields()[0].value, b"a=b=c");
    }

    #[test]
    fn test_tokenize_empty_body() {
        let mut body: Vec<u8> = Vec::new();
        let mut msg: Message<'_, 4> = Message::new();
        assert_eq!(tokenize(&mut body, &mut msg).unwrap(), 0);
        assert!(msg.is_empty());
    }

    #[test]
    fn test_count_fields_malformed() {
        assert_eq!(
            count_fields(b"35=D\x01=X\x01"),
            Err(DecodeError::MalformedField { offset: 5 })
        );
        assert_eq!(
            count_fields(b"35=D\x01\x01"),
            Err(DecodeError::MalformedField { offset: 5 })
        );
        assert_eq!(
            count_fields(b"35=\x01"),
            Err(DecodeError::MalformedField { offset: 0 })
        );
        assert_eq!(
            count_fields(b"35D\x01"),
            Err(DecodeError::MalformedField { offset: 0 })
        );
        assert_eq!(
            count_fields(b"35=D\x0155=AAPL"),
            Err(DecodeError::MalformedField { offset: 5 })
        );
    }

    #[test]
    fn test_adjacent_separators_rejected() {
        assert_eq!(
            count_fields(b"35==D\x01"),
            Err(DecodeError::MalformedField { offset: 0 })
        );
        assert_eq!(
            count_fields(b"35=D\x0155===\x01"),
            Err(DecodeError::MalformedField { offset: 5 })
        );
        assert_eq!(count_fields(b"58=a==b\x01"), Ok(1));

        let original = b"35==D\x01".to_vec();
        let mut body = original.clone();
        {
            let mut msg: Message<'_, 4> = Message::new();
            assert_eq!(
                tokenize(&mut body, &mut msg),
                Err(DecodeError::MalformedField { offset: 0 })
            );
            assert!(msg.is_empty());
        }
        assert_eq!(body, original);
    }

    #[test]
    fn test_malformed_body_left_untouched() {
        let original = b"35=D\x0155=\x01".to_vec();
        let mut body = original.clone();
        {
            let mut msg: Message<'_, 4> = Message::new();
            assert!(tokenize(&mut body, &mut msg).is_err());
            assert!(msg.is_empty());
        }
        assert_eq!(body, original);
    }

    #[test]
    fn test_too_many_fields() {
        let original = b"1=a\x012=b\x013=c\x01".to_vec();
        let mut body = original.clone();
        {
            let mut msg: Message<'_, 2> = Message::new();
            assert_eq!(
                tokenize(&mut body, &mut msg),
                Err(DecodeError::TooManyFields { capacity: 2 })
            );
            assert!(msg.is_empty());
        }
        assert_eq!(body, original);
    }

    #[test]
    fn test_tokenize_clears_previous_contents() {
        let mut first = b"1=a\x01".to_vec();
        let mut second = b"2=b\x01".to_vec();
        let mut msg: Message<'_, 4> = Message::new();
        tokenize(&mut first, &mut msg).unwrap();
        tokenize(&mut second, &mut msg).unwrap();
        assert_eq!(msg.len(), 1);
        assert_eq!(msg.fields()[0].tag, b"2");
    }
}
