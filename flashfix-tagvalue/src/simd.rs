/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Scan width selection.
//!
//! The checksum engine and the trailer locator each ship several
//! implementations of the same contract: a byte-at-a-time loop, an 8-byte
//! SWAR loop, and SSE2/AVX2 loops on x86_64. [`Strategy`] names them.
//! Every strategy returns exactly the same result for the same input.
//!
//! Detection goes through `is_x86_feature_detected!`, which caches the CPUID
//! result inside the standard library. Nothing here keeps mutable state.

use std::fmt;

/// Implementation width used by the checksum engine and trailer locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
    /// One byte per iteration.
    Scalar,
    /// Eight bytes per iteration inside a `u64`.
    Word,
    /// Sixteen bytes per iteration (x86_64 baseline).
    Sse2,
    /// Thirty-two bytes per iteration (x86_64 with AVX2).
    Avx2,
}

impl Strategy {
    /// Every strategy, narrowest first.
    pub const ALL: [Strategy; 4] = [Self::Scalar, Self::Word, Self::Sse2, Self::Avx2];

    /// Returns the widest strategy supported by the running CPU.
    #[inline]
    #[must_use]
    pub fn detect() -> Self {
        best_available()
    }

    /// Returns true if this strategy can run on the current CPU.
    #[must_use]
    pub fn is_supported(self) -> bool {
        match self {
            Self::Scalar | Self::Word => true,
            Self::Sse2 => cfg!(target_arch = "x86_64"),
            Self::Avx2 => avx2_available(),
        }
    }

    /// Returns this strategy if supported, otherwise the widest supported
    /// strategy narrower than it.
    #[inline]
    #[must_use]
    pub fn resolve(self) -> Self {
        let mut strategy = self;
        while !strategy.is_supported() {
            strategy = strategy.narrower();
        }
        strategy
    }

    /// Bytes consumed per main-loop iteration.
    #[inline]
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Word => 8,
            Self::Sse2 => 16,
            Self::Avx2 => 32,
        }
    }

    const fn narrower(self) -> Self {
        match self {
            Self::Avx2 => Self::Sse2,
            Self::Sse2 => Self::Word,
            Self::Word | Self::Scalar => Self::Scalar,
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scalar => "scalar",
            Self::Word => "word",
            Self::Sse2 => "sse2",
            Self::Avx2 => "avx2",
        };
        f.write_str(name)
    }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn avx2_available() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(not(target_arch = "x86_64"))]
#[inline]
fn avx2_available() -> bool {
    false
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn best_available() -> Strategy {
    if avx2_available() {
        Strategy::Avx2
    } else {
        Strategy::Sse2
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline]
fn best_available() -> Strategy {
    Strategy::Word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_supported() {
        assert!(Strategy::detect().is_supported());
        assert!(Strategy::detect() >= Strategy::Word);
    }

    #[test]
    fn test_resolve_always_supported() {
        for strategy in Strategy::ALL {
            let resolved = strategy.resolve();
            assert!(resolved.is_supported());
            assert!(resolved <= strategy);
        }
        assert_eq!(Strategy::Scalar.resolve(), Strategy::Scalar);
        assert_eq!(Strategy::Word.resolve(), Strategy::Word);
    }

    #[test]
    fn test_width_and_display() {
        assert_eq!(Strategy::Word.width(), 8);
        assert_eq!(Strategy::Avx2.width(), 32);
        assert_eq!(Strategy::Sse2.to_string(), "sse2");
    }
}
