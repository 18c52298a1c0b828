//! The boundary between the harness and the codec under test.

use crate::cases::MaxBits;
use crate::error::CodecError;
use crate::stream::{ByteSink, ByteSource};

/// Resets the string table.
pub const CLEAR_CODE: u32 = 256;
/// Terminates the stream.
pub const END_CODE: u32 = 257;
/// First code assigned to a multi-byte string.
pub const FIRST_CODE: u32 = 258;

/// Bit width needed for codes below `next_code`.
#[inline]
pub(crate) const fn code_width(next_code: u32) -> u32 {
    u32::BITS - (next_code - 1).leading_zeros()
}

/// A byte-stream compressor/decompressor pair driven through pull/push callbacks.
///
/// On success `compress` has drained `source` and pushed every output byte in
/// order. `decompress` must tolerate truncated and corrupted input: it may
/// fail or produce wrong bytes, but must not panic.
pub trait Codec {
    fn compress(
        &mut self,
        sink: &mut dyn ByteSink,
        source: &mut dyn ByteSource,
        max_bits: MaxBits,
    ) -> Result<(), CodecError>;

    fn decompress(
        &mut self,
        sink: &mut dyn ByteSink,
        source: &mut dyn ByteSource,
    ) -> Result<(), CodecError>;
}

impl<C: Codec + ?Sized> Codec for &mut C {
    fn compress(
        &mut self,
        sink: &mut dyn ByteSink,
        source: &mut dyn ByteSource,
        max_bits: MaxBits,
    ) -> Result<(), CodecError> {
        (**self).compress(sink, source, max_bits)
    }

    fn decompress(
        &mut self,
        sink: &mut dyn ByteSink,
        source: &mut dyn ByteSource,
    ) -> Result<(), CodecError> {
        (**self).decompress(sink, source)
    }
}

/// Variable-width LZW with a configurable symbol ceiling.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lzw;

impl Codec for Lzw {
    fn compress(
        &mut self,
        sink: &mut dyn ByteSink,
        source: &mut dyn ByteSource,
        max_bits: MaxBits,
    ) -> Result<(), CodecError> {
        crate::compress::compress(sink, source, max_bits);
        Ok(())
    }

    fn decompress(
        &mut self,
        sink: &mut dyn ByteSink,
        source: &mut dyn ByteSource,
    ) -> Result<(), CodecError> {
        crate::decompress::decompress(sink, source)
    }
}
