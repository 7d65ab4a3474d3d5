/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Borrowed tag=value field.
//!
//! A [`Field`] never owns its bytes. When serializing it points into caller
//! data that outlives the call; after deserializing it points into the
//! caller's receive buffer, whose separators have been overwritten in place.

use std::fmt;

/// Zero-copy tag=value pair.
///
/// Tag and value are kept as raw bytes, exactly as they travel on the wire.
/// Neither should be empty in a well-formed message.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Field<'a> {
    /// Tag bytes (ASCII digits in standard FIX).
    pub tag: &'a [u8],
    /// Value bytes, without delimiters.
    pub value: &'a [u8],
}

impl<'a> Field<'a> {
    /// Creates a new field from tag and value bytes.
    ///
    /// # Arguments
    /// * `tag` - The tag bytes
    /// * `value` - The value bytes
    #[inline]
    #[must_use]
    pub const fn new(tag: &'a [u8], value: &'a [u8]) -> Self {
        Self { tag, value }
    }

    /// Creates a new field from string slices.
    #[inline]
    #[must_use]
    pub const fn from_strs(tag: &'a str, value: &'a str) -> Self {
        Self::new(tag.as_bytes(), value.as_bytes())
    }

    /// Returns the tag bytes.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> &'a [u8] {
        self.tag
    }

    /// Returns the value bytes.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Returns the length of the tag in bytes.
    #[inline]
    #[must_use]
    pub const fn tag_len(&self) -> usize {
        self.tag.len()
    }

    /// Returns the length of the value in bytes.
    #[inline]
    #[must_use]
    pub const fn value_len(&self) -> usize {
        self.value.len()
    }

    /// Bytes this field occupies on the wire: `tag`, `=`, `value`, SOH.
    #[inline]
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        self.tag.len() + self.value.len() + 2
    }

    /// Returns true if tag and value are both non-empty.
    #[inline]
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        !self.tag.is_empty() && !self.value.is_empty()
    }

    /// Parses the tag as a FIX tag number.
    ///
    /// # Returns
    /// The tag number, or `None` if the tag is empty, not all digits, or
    /// does not fit in a `u32`.
    #[must_use]
    pub fn tag_number(&self) -> Option<u32> {
        if self.tag.is_empty() {
            return None;
        }

        let mut result: u32 = 0;
        for &b in self.tag {
            if !b.is_ascii_digit() {
                return None;
            }
            result = result.checked_mul(10)?.checked_add((b - b'0') as u32)?;
        }

        Some(result)
    }

    /// Returns true if the tag bytes equal `tag`.
    #[inline]
    #[must_use]
    pub fn has_tag(&self, tag: &[u8]) -> bool {
        self.tag == tag
    }

    /// Returns the value as a string slice.
    ///
    /// # Errors
    /// Returns `Utf8Error` if the value is not valid UTF-8.
    pub fn value_str(&self) -> Result<&'a str, std::str::Utf8Error> {
        std::str::from_utf8(self.value)
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("tag", &String::from_utf8_lossy(self.tag))
            .field("value", &String::from_utf8_lossy(self.value))
            .finish()
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}",
            String::from_utf8_lossy(self.tag),
            String::from_utf8_lossy(self.value)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lengths() {
        let field = Field::new(b"52", b"20250210-15:15:24.000");
        assert_eq!(field.tag_len(), 2);
        assert_eq!(field.value_len(), 21);
        assert_eq!(field.encoded_len(), 25);
        assert!(field.is_well_formed());
    }

    #[test]
    fn test_field_tag_number() {
        assert_eq!(Field::from_strs("35", "D").tag_number(), Some(35));
        assert_eq!(Field::from_strs("8", "FIX.4.4").tag_number(), Some(8));
        assert_eq!(Field::from_strs("", "x").tag_number(), None);
        assert_eq!(Field::from_strs("3a", "x").tag_number(), None);
        assert_eq!(Field::from_strs("99999999999", "x").tag_number(), None);
    }

    #[test]
    fn test_field_value_str() {
        let field = Field::from_strs("55", "AAPL");
        assert_eq!(field.value_str().unwrap(), "AAPL");
        assert!(field.has_tag(b"55"));

        let invalid = Field::new(b"58", &[0xFF, 0xFE]);
        assert!(invalid.value_str().is_err());
    }

    #[test]
    fn test_field_empty_parts() {
        assert!(!Field::new(b"", b"1").is_well_formed());
        assert!(!Field::new(b"1", b"").is_well_formed());
    }

    #[test]
    fn test_field_display() {
        let field = Field::from_strs("49", "BROKER");
        assert_eq!(field.to_string(), "49=BROKER");
    }
}
