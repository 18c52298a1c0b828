use crate::cases::MaxBits;
use crate::codec::{CLEAR_CODE, END_CODE, FIRST_CODE, code_width};
use crate::error::CodecError;
use crate::stream::{ByteSink, ByteSource};

type Result<T> = core::result::Result<T, CodecError>;

/// Number of single-byte root codes.
const ROOT_CODES: u32 = 256;

/// Unpacks variable-width codes, least significant bit first.
struct BitReader<'a, R: ?Sized> {
    source: &'a mut R,
    acc: u32,
    count: u32,
}

impl<'a, R: ByteSource + ?Sized> BitReader<'a, R> {
    fn new(source: &'a mut R) -> Self {
        Self {
            source,
            acc: 0,
            count: 0,
        }
    }

    /// Reads `width` bits, or `None` if the source runs dry first.
    fn read(&mut self, width: u32) -> Option<u32> {
        while self.count < width {
            let byte = self.source.pull()?;
            self.acc |= u32::from(byte) << self.count;
            self.count += 8;
        }
        let code = self.acc & ((1 << width) - 1);
        self.acc >>= width;
        self.count -= width;
        Some(code)
    }
}

/// String table for the decoder: each code stores its prefix code and final byte.
struct DecodeTable {
    prefix: Vec<u16>,
    suffix: Vec<u8>,
    next_code: u32,
    limit: u32,
}

impl DecodeTable {
    fn new(max_bits: MaxBits) -> Self {
        let limit = 1u32 << max_bits.get();
        let size = limit as usize;
        Self {
            prefix: vec![0; size],
            suffix: vec![0; size],
            next_code: FIRST_CODE,
            limit,
        }
    }

    const fn reset(&mut self) {
        self.next_code = FIRST_CODE;
    }

    /// Writes the string for `code` into `out`. `code` must be a root or defined.
    fn expand(&self, code: u32, out: &mut Vec<u8>) {
        out.clear();
        let mut code = code as usize;
        while code >= FIRST_CODE as usize {
            out.push(self.suffix[code]);
            code = self.prefix[code] as usize;
        }
        out.push(code as u8);
        out.reverse();
    }

    fn insert(&mut self, prefix: u32, byte: u8) {
        if self.next_code < self.limit {
            let slot = self.next_code as usize;
            self.prefix[slot] = prefix as u16;
            self.suffix[slot] = byte;
            self.next_code += 1;
        }
    }
}

/// Decompresses a stream produced by [`compress`](crate::compress::compress).
///
/// Corrupted or truncated input yields an error or wrong output, never a panic:
/// every code is range-checked against the table before it is expanded, and
/// string lengths are bounded by the table size.
pub fn decompress<W, R>(sink: &mut W, source: &mut R) -> Result<()>
where
    W: ByteSink + ?Sized,
    R: ByteSource + ?Sized,
{
    let header = source.pull().ok_or(CodecError::MissingHeader)?;
    let max_bits = header
        .checked_add(MaxBits::MIN.get())
        .and_then(MaxBits::new)
        .ok_or(CodecError::InvalidHeader(header))?;

    let mut table = DecodeTable::new(max_bits);
    let mut bits = BitReader::new(source);
    let mut string = Vec::new();
    let mut prev: Option<u32> = None;

    loop {
        // The encoder is one entry ahead once a previous code exists.
        let encoder_next = match prev {
            None => table.next_code,
            Some(_) => (table.next_code + 1).min(table.limit),
        };

        let code = bits
            .read(code_width(encoder_next))
            .ok_or(CodecError::UnexpectedEof)?;

        match code {
            END_CODE => return Ok(()),
            CLEAR_CODE => {
                table.reset();
                prev = None;
                continue;
            }
            _ => {}
        }

        let Some(p) = prev else {
            if code >= ROOT_CODES {
                return Err(CodecError::InvalidCode {
                    code,
                    next: table.next_code,
                });
            }
            sink.push(code as u8);
            prev = Some(code);
            continue;
        };

        if code < ROOT_CODES || (code >= FIRST_CODE && code < table.next_code) {
            table.expand(code, &mut string);
        } else if code == table.next_code && code < table.limit {
            // The code being defined right now: prev's string plus its own first byte.
            table.expand(p, &mut string);
            string.push(string[0]);
        } else {
            return Err(CodecError::InvalidCode {
                code,
                next: table.next_code,
            });
        }

        for &byte in &string {
            sink.push(byte);
        }
        table.insert(p, string[0]);
        prev = Some(code);
    }
}
