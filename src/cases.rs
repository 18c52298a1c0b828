//! Test-case generation: the max-bits sweep and the exhaustive truncation ladder.

use core::fmt;
use core::ops::Range;
use std::path::Path;

/// Maximum symbol width accepted by the codec, always within `9..=16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaxBits(u8);

impl MaxBits {
    pub const MIN: Self = Self(9);
    pub const MAX: Self = Self(16);

    /// Returns `None` when `bits` is outside `9..=16`.
    #[must_use]
    pub const fn new(bits: u8) -> Option<Self> {
        if bits >= Self::MIN.0 && bits <= Self::MAX.0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Every supported width, smallest first.
    pub fn all() -> impl Iterator<Item = Self> + Clone {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }
}

impl fmt::Display for MaxBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Which max-bits values to test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaxBitsSelection {
    /// Sweep every supported width.
    #[default]
    Cycle,
    Fixed(MaxBits),
}

impl MaxBitsSelection {
    pub fn iter(self) -> impl Iterator<Item = MaxBits> + Clone {
        let (lo, hi) = match self {
            Self::Cycle => (MaxBits::MIN.0, MaxBits::MAX.0),
            Self::Fixed(bits) => (bits.0, bits.0),
        };
        (lo..=hi).map(MaxBits)
    }
}

/// One configuration to run: a max-bits value and the slice of the file to feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase<'a> {
    pub filename: &'a Path,
    pub max_bits: MaxBits,
    pub window: Range<usize>,
}

impl TestCase<'_> {
    /// Whether this case covers less than a file of `file_len` bytes.
    #[must_use]
    pub const fn is_truncated(&self, file_len: usize) -> bool {
        self.window.start != 0 || self.window.end != file_len
    }
}

/// Shrinking windows over a file of `len` bytes.
///
/// The first window is the whole file. Each step drops `ceil(size / 100)`
/// bytes, alternately from the front and from the back. The last window
/// yielded is the first one whose size is `<= 1` or `<= 1%` of the original.
#[derive(Debug, Clone)]
pub struct TruncationLadder {
    original: usize,
    offset: usize,
    size: usize,
    trim_front: bool,
    done: bool,
}

impl TruncationLadder {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            original: len,
            offset: 0,
            size: len,
            trim_front: true,
            done: false,
        }
    }

    const fn is_last(&self) -> bool {
        self.size <= 1 || self.size.saturating_mul(100) <= self.original
    }
}

impl Iterator for TruncationLadder {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let window = self.offset..self.offset + self.size;

        if self.is_last() {
            self.done = true;
        } else {
            let step = self.size.div_ceil(100);
            if self.trim_front {
                self.offset += step;
            }
            self.size -= step;
            self.trim_front = !self.trim_front;
        }

        Some(window)
    }
}

/// Builds the case matrix for one file.
///
/// Without `exhaustive` this is one full-file case per selected width. With
/// it, every window of the [`TruncationLadder`] gets the full width sweep.
pub fn generate(
    filename: &Path,
    len: usize,
    selection: MaxBitsSelection,
    exhaustive: bool,
) -> impl Iterator<Item = TestCase<'_>> {
    let ladder = TruncationLadder::new(len);
    let windows: Box<dyn Iterator<Item = Range<usize>>> = if exhaustive {
        Box::new(ladder)
    } else {
        Box::new(ladder.take(1))
    };

    windows.flat_map(move |window| {
        selection.iter().map(move |max_bits| TestCase {
            filename,
            max_bits,
            window: window.clone(),
        })
    })
}
