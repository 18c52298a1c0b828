use crate::cases::MaxBits;
use crate::codec::{CLEAR_CODE, END_CODE, FIRST_CODE, code_width};
use crate::stream::{ByteSink, ByteSource};

/// Marker for "no child" / "no sibling". Code 0 is a root and can never be a child.
const EMPTY_ENTRY: u16 = 0;

/// Packs variable-width codes into bytes, least significant bit first.
struct BitWriter<'a, W: ?Sized> {
    sink: &'a mut W,
    acc: u32,
    count: u32,
}

impl<'a, W: ByteSink + ?Sized> BitWriter<'a, W> {
    fn new(sink: &'a mut W) -> Self {
        Self {
            sink,
            acc: 0,
            count: 0,
        }
    }

    /// Appends the low `width` bits of `code`. `width` is at most 16.
    fn write(&mut self, code: u32, width: u32) {
        self.acc |= code << self.count;
        self.count += width;
        while self.count >= 8 {
            self.sink.push(self.acc as u8);
            self.acc >>= 8;
            self.count -= 8;
        }
    }

    /// Emits any partial byte, zero-padded.
    fn flush(&mut self) {
        if self.count > 0 {
            self.sink.push(self.acc as u8);
            self.acc = 0;
            self.count = 0;
        }
    }
}

/// String table for the encoder.
///
/// Every string is a known prefix code plus one byte. Children of a code are
/// kept in a singly linked sibling list, so a lookup walks at most 256 entries
/// and a reset only has to clear the 256 roots.
struct Dictionary {
    first_child: Vec<u16>,
    next_sibling: Vec<u16>,
    suffix: Vec<u8>,
    next_code: u32,
    limit: u32,
}

impl Dictionary {
    fn new(max_bits: MaxBits) -> Self {
        let limit = 1u32 << max_bits.get();
        let size = limit as usize;
        Self {
            first_child: vec![EMPTY_ENTRY; size],
            next_sibling: vec![EMPTY_ENTRY; size],
            suffix: vec![0; size],
            next_code: FIRST_CODE,
            limit,
        }
    }

    fn reset(&mut self) {
        self.first_child[..256].fill(EMPTY_ENTRY);
        self.next_code = FIRST_CODE;
    }

    const fn is_full(&self) -> bool {
        self.next_code >= self.limit
    }

    /// Width of the next code to be written.
    const fn width(&self) -> u32 {
        code_width(self.next_code)
    }

    fn find(&self, prefix: u16, byte: u8) -> Option<u16> {
        let mut child = self.first_child[prefix as usize];
        while child != EMPTY_ENTRY {
            if self.suffix[child as usize] == byte {
                return Some(child);
            }
            child = self.next_sibling[child as usize];
        }
        None
    }

    /// Adds `prefix + byte` as the next code. The caller checks [`is_full`](Self::is_full).
    fn insert(&mut self, prefix: u16, byte: u8) {
        let code = self.next_code as u16;
        let slot = code as usize;
        self.suffix[slot] = byte;
        self.first_child[slot] = EMPTY_ENTRY;
        self.next_sibling[slot] = self.first_child[prefix as usize];
        self.first_child[prefix as usize] = code;
        self.next_code += 1;
    }
}

/// Compresses everything `source` yields into `sink`.
///
/// The stream starts with one header byte (`max_bits - 9`), followed by codes
/// packed LSB first and terminated by the end code. Each code is written with
/// the bit length of the largest code the encoder could have produced at that
/// point, so the decoder can track widths without extra signalling. When the
/// table reaches `1 << max_bits` entries a clear code resets it.
pub fn compress<W, R>(sink: &mut W, source: &mut R, max_bits: MaxBits)
where
    W: ByteSink + ?Sized,
    R: ByteSource + ?Sized,
{
    sink.push(max_bits.get() - MaxBits::MIN.get());

    let mut dict = Dictionary::new(max_bits);
    let mut bits = BitWriter::new(sink);

    let Some(first) = source.pull() else {
        bits.write(END_CODE, dict.width());
        bits.flush();
        return;
    };

    let mut prefix = u16::from(first);

    while let Some(byte) = source.pull() {
        if let Some(code) = dict.find(prefix, byte) {
            prefix = code;
            continue;
        }

        bits.write(u32::from(prefix), dict.width());

        if dict.is_full() {
            bits.write(CLEAR_CODE, dict.width());
            dict.reset();
        } else {
            dict.insert(prefix, byte);
        }

        prefix = u16::from(byte);
    }

    bits.write(u32::from(prefix), dict.width());

    // The decoder defines one more entry after reading the last code; the
    // end code is sized as if the encoder had done the same.
    let end_width = code_width((dict.next_code + 1).min(dict.limit));
    bits.write(END_CODE, end_width);
    bits.flush();
}
