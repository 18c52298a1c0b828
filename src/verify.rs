//! Byte-by-byte comparison of decompressed output against the original.

use core::fmt;

use crate::stream::ByteSink;

/// Push-only sink that checks each incoming byte against a reference.
#[derive(Debug)]
pub struct Verifier<'a> {
    reference: &'a [u8],
    cursor: usize,
    wrap_count: usize,
    mismatch_count: usize,
    first_mismatch: Option<usize>,
}

impl<'a> Verifier<'a> {
    #[must_use]
    pub const fn new(reference: &'a [u8]) -> Self {
        Self {
            reference,
            cursor: 0,
            wrap_count: 0,
            mismatch_count: 0,
            first_mismatch: None,
        }
    }

    /// Clears all counters so the same reference can be checked again.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.wrap_count = 0;
        self.mismatch_count = 0;
        self.first_mismatch = None;
    }

    /// Summarizes the comparison once the candidate stream is drained.
    #[must_use]
    pub fn finish(&self) -> VerificationResult {
        VerificationResult {
            bytes_checked: self.cursor,
            mismatch_count: self.mismatch_count,
            first_mismatch: self.first_mismatch,
            length_short: self.reference.len() - self.cursor,
            length_extra: self.wrap_count,
        }
    }
}

impl ByteSink for Verifier<'_> {
    #[inline]
    fn push(&mut self, byte: u8) {
        let Some(&expected) = self.reference.get(self.cursor) else {
            // Reference exhausted: the candidate produced extra bytes.
            self.wrap_count += 1;
            return;
        };

        if expected != byte {
            if self.mismatch_count == 0 {
                self.first_mismatch = Some(self.cursor);
            }
            self.mismatch_count += 1;
        }
        self.cursor += 1;
    }
}

/// Outcome of comparing a candidate stream with its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationResult {
    /// Candidate bytes that had a reference byte to compare against.
    pub bytes_checked: usize,
    pub mismatch_count: usize,
    pub first_mismatch: Option<usize>,
    /// Reference bytes the candidate never produced.
    pub length_short: usize,
    /// Candidate bytes produced after the reference ran out.
    pub length_extra: usize,
}

impl VerificationResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.length_short == 0 && self.length_extra == 0 && self.mismatch_count == 0
    }

    /// Every failure that applies, in reporting order.
    #[must_use]
    pub fn failures(&self) -> Vec<VerifyFailure> {
        let mut failures = Vec::new();
        if self.bytes_checked == 0 && self.length_extra == 0 && self.length_short > 0 {
            failures.push(VerifyFailure::NoOutput);
        }
        if self.length_short > 0 {
            failures.push(VerifyFailure::Short {
                missing: self.length_short,
            });
        }
        if self.length_extra > 0 {
            failures.push(VerifyFailure::Extra {
                surplus: self.length_extra,
            });
        }
        if let Some(first) = self.first_mismatch {
            failures.push(VerifyFailure::Mismatch {
                count: self.mismatch_count,
                first,
            });
        }
        failures
    }
}

/// A single verification problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    NoOutput,
    Short { missing: usize },
    Extra { surplus: usize },
    Mismatch { count: usize, first: usize },
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOutput => write!(f, "decompression produced no bytes"),
            Self::Short { missing } => write!(f, "decompression stopped {missing} bytes short"),
            Self::Extra { surplus } => {
                write!(f, "decompression generated {surplus} extra bytes")
            }
            Self::Mismatch { count, first } => {
                write!(f, "{count} byte data errors starting at index {first}")
            }
        }
    }
}
