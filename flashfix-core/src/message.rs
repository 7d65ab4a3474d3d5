/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Fixed-capacity field list.
//!
//! [`Message`] stores up to `N` [`Field`]s inline, in insertion order. The
//! capacity is chosen by the caller at compile time, so filling a message
//! never touches the heap.

use crate::error::EncodeError;
use crate::field::Field;
use crate::wire::DEFAULT_MAX_FIELDS;
use arrayvec::ArrayVec;

/// Ordered list of borrowed fields with a fixed capacity.
///
/// The codec preserves order in both directions but never checks it, nor
/// does it look for duplicate tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<'a, const N: usize = DEFAULT_MAX_FIELDS> {
    fields: ArrayVec<Field<'a>, N>,
}

impl<'a, const N: usize> Message<'a, N> {
    /// Creates an empty message.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: ArrayVec::new_const(),
        }
    }

    /// Builds a message from an iterator of fields.
    ///
    /// # Errors
    /// Returns `EncodeError::TooManyFields` if the iterator yields more than
    /// `N` fields.
    pub fn from_fields<I>(fields: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = Field<'a>>,
    {
        let mut message = Self::new();
        for field in fields {
            message.push_field(field)?;
        }
        Ok(message)
    }

    /// Appends a field built from tag and value bytes.
    ///
    /// # Errors
    /// Returns `EncodeError::TooManyFields` if the message is full.
    #[inline]
    pub fn push(&mut self, tag: &'a [u8], value: &'a [u8]) -> Result<(), EncodeError> {
        self.push_field(Field::new(tag, value))
    }

    /// Appends a field.
    ///
    /// # Errors
    /// Returns `EncodeError::TooManyFields` if the message is full.
    #[inline]
    pub fn push_field(&mut self, field: Field<'a>) -> Result<(), EncodeError> {
        self.fields
            .try_push(field)
            .map_err(|_| EncodeError::TooManyFields { capacity: N })
    }

    /// Removes every field.
    #[inline]
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Returns the number of fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the message holds no fields.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if no further field can be pushed.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.fields.is_full()
    }

    /// Returns the field capacity `N`.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns the fields as a slice, in order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// Returns an iterator over the fields.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Field<'a>> {
        self.fields.iter()
    }

    /// Gets the first field with the given tag.
    ///
    /// # Arguments
    /// * `tag` - The tag bytes, e.g. `b"35"`
    #[must_use]
    pub fn get(&self, tag: &[u8]) -> Option<&Field<'a>> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Gets the value of the first field with the given tag.
    #[must_use]
    pub fn get_value(&self, tag: &[u8]) -> Option<&'a [u8]> {
        self.get(tag).map(|f| f.value)
    }

    /// Returns the encoded body length: the sum of every field's tag and
    /// value lengths plus two bytes per field for `=` and SOH.
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.fields.iter().map(Field::encoded_len).sum()
    }
}

impl<const N: usize> Default for Message<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'m, 'a, const N: usize> IntoIterator for &'m Message<'a, N> {
    type Item = &'m Field<'a>;
    type IntoIter = std::slice::Iter<'m, Field<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
