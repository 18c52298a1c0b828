//! Fixed-capacity byte streams and the pull/push capabilities codecs are driven through.

/// Producer side of the codec boundary.
pub trait ByteSource {
    /// Returns the next byte, or `None` once the source is exhausted.
    fn pull(&mut self) -> Option<u8>;
}

/// Consumer side of the codec boundary.
pub trait ByteSink {
    fn push(&mut self, byte: u8);
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    #[inline]
    fn pull(&mut self) -> Option<u8> {
        (**self).pull()
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    #[inline]
    fn push(&mut self, byte: u8) {
        (**self).push(byte);
    }
}

/// A finite, position-addressed byte buffer.
///
/// Reads stop at the end of the buffer. Writes past the end wrap back to
/// position 0 and bump [`wrap_count`](Self::wrap_count) instead of failing, so
/// a caller can tell "produced more than was allocated" apart from a crash.
///
/// The storage is generic: a borrowed `&[u8]` serves as a read-only source,
/// a `Vec<u8>` as a reusable sink.
#[derive(Debug, Clone)]
pub struct ByteStream<B = Vec<u8>> {
    buffer: B,
    cursor: usize,
    wrap_count: usize,
}

impl<B: AsRef<[u8]>> ByteStream<B> {
    /// Wraps `buffer`; the stream's capacity is the buffer length.
    pub const fn new(buffer: B) -> Self {
        Self {
            buffer,
            cursor: 0,
            wrap_count: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().len()
    }

    /// Current cursor. For a sink that never wrapped, this is the number of bytes written.
    #[inline]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Number of times the cursor crossed the capacity boundary while pushing.
    #[inline]
    pub const fn wrap_count(&self) -> usize {
        self.wrap_count
    }

    #[inline]
    pub const fn has_wrapped(&self) -> bool {
        self.wrap_count > 0
    }

    /// The bytes before the cursor.
    pub fn written(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.cursor]
    }

    /// Rewinds the cursor and clears the wrap counter. Contents are kept.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.wrap_count = 0;
    }

    pub fn into_inner(self) -> B {
        self.buffer
    }
}

impl ByteStream<Vec<u8>> {
    /// Allocates a zeroed sink of `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(vec![0; capacity])
    }

    /// Resets the stream and changes its capacity.
    ///
    /// Shrinking keeps the allocation, so a sink sized for the largest case
    /// of a file can be reused for every smaller one.
    pub fn reset_with_capacity(&mut self, capacity: usize) {
        self.buffer.resize(capacity, 0);
        self.reset();
    }
}

impl<B: AsRef<[u8]>> ByteSource for ByteStream<B> {
    #[inline]
    fn pull(&mut self) -> Option<u8> {
        let byte = *self.buffer.as_ref().get(self.cursor)?;
        self.cursor += 1;
        Some(byte)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteSink for ByteStream<B> {
    #[inline]
    fn push(&mut self, byte: u8) {
        let buffer = self.buffer.as_mut();
        if buffer.is_empty() {
            // Nothing can ever be stored; every byte is an overflow.
            self.wrap_count += 1;
            return;
        }
        if self.cursor == buffer.len() {
            self.cursor = 0;
            self.wrap_count += 1;
        }
        buffer[self.cursor] = byte;
        self.cursor += 1;
    }
}

/// Sink capacity for compressing `len` bytes: `len + len * percent / 100 + slack`.
///
/// With the harness defaults (100 %, 10 bytes) a wrap means the codec more
/// than doubled its input, which a variable-width code of at most 16 bits per
/// input byte cannot do.
#[must_use]
pub const fn sink_capacity(len: usize, percent: usize, slack: usize) -> usize {
    len.saturating_add(len.saturating_mul(percent) / 100)
        .saturating_add(slack)
}
