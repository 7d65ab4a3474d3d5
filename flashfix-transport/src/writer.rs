/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Resumable vectored writes.
//!
//! [`VectoredWriter`] sends a [`VectoredFrame`] with `write_vectored`, so
//! the field bytes go to the socket straight from where they live. A
//! non-blocking socket may accept only part of the frame, or nothing at all;
//! the writer remembers how far it got and the next call resumes there.

use flashfix_core::{EncodeError, Message, TransportError};
use flashfix_tagvalue::{Strategy, VectoredFrame};
use std::io::{self, IoSlice, Write};
use tracing::trace;

/// Most slices handed to a single `write_vectored` call.
pub const MAX_IO_SLICES: usize = 64;

/// Outcome of a successful write call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteProgress {
    /// Bytes were written but part of the frame is still pending.
    Partial {
        /// Bytes written by this call.
        written: usize,
        /// Bytes still to send.
        remaining: usize,
    },
    /// The whole frame has been written.
    Complete {
        /// Bytes written by this call.
        written: usize,
    },
}

impl WriteProgress {
    /// Returns true once the whole frame has been written.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// Writes one framed message with vectored I/O, resuming after partial
/// writes.
#[derive(Debug, Clone)]
pub struct VectoredWriter<'m, 'a, const N: usize> {
    frame: VectoredFrame<'m, 'a, N>,
    written: usize,
}

impl<'m, 'a, const N: usize> VectoredWriter<'m, 'a, N> {
    /// Creates a writer for an already built frame.
    #[must_use]
    pub const fn new(frame: VectoredFrame<'m, 'a, N>) -> Self {
        Self { frame, written: 0 }
    }

    /// Frames `message` and creates a writer for it.
    ///
    /// # Errors
    /// Returns `EncodeError::BodyTooLarge` if the message cannot be framed.
    pub fn for_message(message: &'m Message<'a, N>) -> Result<Self, EncodeError> {
        VectoredFrame::new(message).map(Self::new)
    }

    /// Frames `message` with an explicit checksum strategy.
    ///
    /// # Errors
    /// Returns `EncodeError::BodyTooLarge` if the message cannot be framed.
    pub fn with_strategy(
        message: &'m Message<'a, N>,
        strategy: Strategy,
    ) -> Result<Self, EncodeError> {
        VectoredFrame::with_strategy(message, strategy).map(Self::new)
    }

    /// The frame being written.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> &VectoredFrame<'m, 'a, N> {
        &self.frame
    }

    /// Bytes written so far, across all calls.
    #[inline]
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Bytes still to write.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.frame.len() - self.written
    }

    /// Returns true once the whole frame has been written.
    #[inline]
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.written == self.frame.len()
    }

    /// Issues a single `write_vectored` for the unsent part of the frame.
    ///
    /// `Interrupted` is retried transparently.
    ///
    /// # Errors
    /// - `TransportError::WouldBlock` if the writer cannot accept data now;
    ///   progress is kept
    /// - `TransportError::Io` with `WriteZero` if the writer accepted nothing
    /// - `TransportError::Io` for any other failure
    pub fn write_once<W: Write + ?Sized>(
        &mut self,
        writer: &mut W,
    ) -> Result<WriteProgress, TransportError> {
        if self.is_done() {
            return Ok(WriteProgress::Complete { written: 0 });
        }

        let mut slices = [IoSlice::new(&[]); MAX_IO_SLICES];
        let count = self.frame.fill_io_slices(self.written, &mut slices);
        let total = self.frame.len();

        loop {
            match writer.write_vectored(&slices[..count]) {
                Ok(0) => {
                    return Err(TransportError::Io(io::Error::from(
                        io::ErrorKind::WriteZero,
                    )));
                }
                Ok(n) => {
                    let n = n.min(total - self.written);
                    self.written += n;
                    let remaining = total - self.written;
                    if remaining == 0 {
                        return Ok(WriteProgress::Complete { written: n });
                    }
                    trace!(written = n, remaining, "partial vectored write");
                    return Ok(WriteProgress::Partial {
                        written: n,
                        remaining,
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    trace!(
                        written = self.written,
                        remaining = total - self.written,
                        "vectored write would block"
                    );
                    return Err(TransportError::WouldBlock);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Writes until the frame is complete.
    ///
    /// # Returns
    /// `WriteProgress::Complete` with the bytes written by this call.
    ///
    /// # Errors
    /// As [`write_once`](Self::write_once). After `WouldBlock` call again
    /// once the writer is ready; bytes already sent are not repeated.
    pub fn write_to<W: Write + ?Sized>(
        &mut self,
        writer: &mut W,
    ) -> Result<WriteProgress, TransportError> {
        let mut written = 0;
        loop {
            match self.write_once(writer)? {
                WriteProgress::Partial { written: n, .. } => written += n,
                WriteProgress::Complete { written: n } => {
                    return Ok(WriteProgress::Complete {
                        written: written + n,
                    });
                }
            }
        }
    }
}
