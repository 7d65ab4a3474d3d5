/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Scatter/gather view of a framed message.
//!
//! [`VectoredFrame`] describes the same bytes [`serialize_framed`] would
//! produce as a sequence of segments pointing at the header, the field
//! tags and values, and the trailer. Only the header and the trailer are
//! stored; the field bytes are never copied.
//!
//! [`serialize_framed`]: crate::encoder::serialize_framed

use crate::checksum::{ChecksumAccumulator, checksum_field};
use crate::simd::Strategy;
use flashfix_core::{EncodeError, Message};
use flashfix_core::wire::{BEGIN_STRING, BODY_LENGTH_TAG, SOH, TRAILER_LEN};
use std::io::IoSlice;

/// Longest possible header: BeginString, `9=`, twenty digits, SOH.
pub const MAX_HEADER_LEN: usize = BEGIN_STRING.len() + BODY_LENGTH_TAG.len() + 20 + 1;

const EQUALS_SEGMENT: &[u8] = b"=";
const SOH_SEGMENT: &[u8] = &[SOH];

/// Framed message as a list of borrowed segments.
#[derive(Debug, Clone)]
pub struct VectoredFrame<'m, 'a, const N: usize> {
    message: &'m Message<'a, N>,
    header: [u8; MAX_HEADER_LEN],
    header_len: usize,
    trailer: [u8; TRAILER_LEN],
    checksum: u8,
    len: usize,
}

impl<'m, 'a, const N: usize> VectoredFrame<'m, 'a, N> {
    /// Builds the frame for `message` using the detected checksum strategy.
    ///
    /// # Errors
    /// Returns `EncodeError::BodyTooLarge` if the body exceeds a five-digit
    /// BodyLength.
    pub fn new(message: &'m Message<'a, N>) -> Result<Self, EncodeError> {
        Self::with_strategy(message, Strategy::detect())
    }

    /// Builds the frame for `message` with an explicit checksum strategy.
    ///
    /// The checksum is accumulated segment by segment, so the message is
    /// read once here and never assembled.
    ///
    /// # Errors
    /// Returns `EncodeError::BodyTooLarge` if the body exceeds a five-digit
    /// BodyLength.
    pub fn with_strategy(
        message: &'m Message<'a, N>,
        strategy: Strategy,
    ) -> Result<Self, EncodeError> {
        let body_len = message.body_len();
        EncodeError::check_body_len(body_len)?;

        let mut header = [0u8; MAX_HEADER_LEN];
        let mut digit_buf = itoa::Buffer::new();
        let digits = digit_buf.format(body_len).as_bytes();
        let begin = BEGIN_STRING.len();
        let tag_end = begin + BODY_LENGTH_TAG.len();
        let digits_end = tag_end + digits.len();
        header[..begin].copy_from_slice(BEGIN_STRING);
        header[begin..tag_end].copy_from_slice(BODY_LENGTH_TAG);
        header[tag_end..digits_end].copy_from_slice(digits);
        header[digits_end] = SOH;
        let header_len = digits_end + 1;

        let mut frame = Self {
            message,
            header,
            header_len,
            trailer: [0u8; TRAILER_LEN],
            checksum: 0,
            len: header_len + body_len + TRAILER_LEN,
        };

        let mut acc = ChecksumAccumulator::with_strategy(strategy);
        acc.update(frame.header());
        for segment in frame.body_segments() {
            acc.update(segment);
        }
        frame.checksum = acc.value();
        frame.trailer = checksum_field(frame.checksum);
        Ok(frame)
    }

    /// Total number of bytes in the frame.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// A frame always holds at least header and trailer.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Checksum carried in the trailer.
    #[inline]
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.checksum
    }

    /// The `8=FIX.4.4<SOH>9=<len><SOH>` segment.
    #[inline]
    #[must_use]
    pub fn header(&self) -> &[u8] {
        &self.header[..self.header_len]
    }

    /// The `10=ddd<SOH>` segment.
    #[inline]
    #[must_use]
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    /// The message being framed.
    #[inline]
    #[must_use]
    pub const fn message(&self) -> &'m Message<'a, N> {
        self.message
    }

    fn body_segments(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.message
            .iter()
            .flat_map(|field| [field.tag, EQUALS_SEGMENT, field.value, SOH_SEGMENT])
    }

    /// Iterates every segment in wire order: header, then `tag`, `=`,
    /// `value`, SOH per field, then the trailer.
    pub fn segments(&self) -> impl Iterator<Item = &[u8]> + '_ {
        std::iter::once(self.header())
            .chain(self.body_segments())
            .chain(std::iter::once(self.trailer()))
    }

    /// Fills `slices` with the segments that follow the first `skip` bytes.
    ///
    /// A segment cut by `skip` contributes only its unsent tail. Empty
    /// segments are left out.
    ///
    /// # Returns
    /// The number of slices filled; less than `slices.len()` only when the
    /// end of the frame was reached.
    pub fn fill_io_slices<'s>(&'s self, skip: usize, slices: &mut [IoSlice<'s>]) -> usize {
        let mut skip = skip;
        let mut filled = 0;

        for segment in self.segments() {
            if filled == slices.len() {
                break;
            }
            if skip >= segment.len() {
                skip -= segment.len();
                continue;
            }
            let rest = &segment[skip..];
            skip = 0;
            slices[filled] = IoSlice::new(rest);
            filled += 1;
        }

        filled
    }

    /// Copies the frame into a single buffer.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for segment in self.segments() {
            out.extend_from_slice(segment);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{header_len, serialize_framed};
    use flashfix_core::Field;

    fn sample() -> Message<'static, 8> {
        Message::from_fields([
            Field::from_strs("35", "D"),
            Field::from_strs("55", "AAPL"),
            Field::from_strs("38", "100"),
        ])
        .unwrap()
    }

    #[test]
    fn test_vectored_matches_flat() {
        let msg = sample();
        let frame = VectoredFrame::new(&msg).unwrap();

        let mut flat = [0u8; 128];
        let n = serialize_framed(&msg, &mut flat).unwrap();

        assert_eq!(frame.len(), n);
        assert_eq!(frame.to_vec(), &flat[..n]);
        assert_eq!(frame.header().len(), header_len(msg.body_len()));
    }

    #[test]
    fn test_segments_layout() {
        let msg = sample();
        let frame = VectoredFrame::new(&msg).unwrap();
        let segments: Vec<&[u8]> = frame.segments().collect();

        // header + 4 per field + trailer
        assert_eq!(segments.len(), 1 + 3 * 4 + 1);
        assert_eq!(segments[1], b"35");
        assert_eq!(segments[2], b"=");
        assert_eq!(segments[3], b"D");
        assert_eq!(segments[4], b"\x01");
        assert_eq!(segments[13], frame.trailer());
    }

    #[test]
    fn test_checksum_matches_strategies() {
        let msg = sample();
        let reference = VectoredFrame::with_strategy(&msg, Strategy::Scalar)
            .unwrap()
            .checksum();
        for strategy in Strategy::ALL {
            assert_eq!(
                VectoredFrame::with_strategy(&msg, strategy)
                    .unwrap()
                    .checksum(),
                reference
            );
        }
    }

    #[test]
    fn test_fill_io_slices_with_skip() {
        let msg = sample();
        let frame = VectoredFrame::new(&msg).unwrap();
        let full = frame.to_vec();

        for skip in 0..=full.len() {
            let mut slices = [IoSlice::new(&[]); 32];
            let n = frame.fill_io_slices(skip, &mut slices);
            let joined: Vec<u8> = slices[..n].iter().flat_map(|s| s.iter().copied()).collect();
            assert_eq!(joined, &full[skip..], "skip {skip}");
        }
    }

    #[test]
    fn test_fill_io_slices_limited() {
        let msg = sample();
        let frame = VectoredFrame::new(&msg).unwrap();
        let mut slices = [IoSlice::new(&[]); 3];
        assert_eq!(frame.fill_io_slices(0, &mut slices), 3);
        assert_eq!(&*slices[0], frame.header());
        assert_eq!(&*slices[1], b"35");
    }

    #[test]
    fn test_empty_message_frame() {
        let msg: Message<'_, 4> = Message::new();
        let frame = VectoredFrame::new(&msg).unwrap();
        assert_eq!(frame.to_vec(), {
            let mut out = [0u8; 32];
            let n = serialize_framed(&msg, &mut out).unwrap();
            out[..n].to_vec()
        });
    }

    #[test]
    fn test_body_too_large() {
        let value = vec![b'x'; 100_000];
        let mut msg: Message<'_, 4> = Message::new();
        msg.push(b"58", &value).unwrap();
        assert_eq!(
            VectoredFrame::new(&msg).err(),
            Some(EncodeError::BodyTooLarge {
                body_len: 100_004,
                max: 99_999
            })
        );
    }
}
