#![no_main]

use libfuzzer_sys::fuzz_target;
use lzw_roundtrip::{ByteStream, MaxBits, Verifier, compress, decompress};

/// Verifies that the decompressor safely handles arbitrary, potentially malformed input.
///
/// # Invariant
/// The decompressor must return either `Ok(_)` or `Err(_)`. It must **never** panic,
/// whatever the header byte, code widths or code values claim.
fn verify_decompression_robustness(data: &[u8]) {
    let mut source = ByteStream::new(data);
    // An empty reference turns every produced byte into a counted surplus, so
    // memory stays flat no matter how much the decoder emits.
    let mut verifier = Verifier::new(&[]);
    let _ = decompress(&mut verifier, &mut source);
}

/// Verifies the lossless round trip at the width selected by the first input byte.
///
/// # Invariant
/// `decompress(compress(data, bits)) == data`, and the compressed size stays
/// within twice the input plus the stream framing.
///
/// # Panics
/// On any mismatch, length error, or decompression failure.
fn verify_round_trip(data: &[u8]) {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let bits = MaxBits::new(9 + selector % 8).unwrap();

    let mut source = ByteStream::new(payload);
    let mut sink = ByteStream::with_capacity(payload.len() * 2 + 10);
    compress(&mut sink, &mut source, bits);
    assert!(
        !sink.has_wrapped(),
        "Compressed output overflowed 2x + 10 for {} input bytes at {bits} bits",
        payload.len()
    );

    let mut packed = ByteStream::new(sink.written());
    let mut verifier = Verifier::new(payload);
    match decompress(&mut verifier, &mut packed) {
        Ok(()) => {
            let result = verifier.finish();
            assert!(
                result.is_success(),
                "Round-trip mismatch at {bits} bits: {result:?}"
            );
        }
        Err(e) => panic!(
            "Round-trip failed! Decompressor rejected valid compressed data.\nError: {e:?}\nInput len: {}",
            payload.len()
        ),
    }
}

/// Verifies that flipping one compressed byte never panics the decoder.
fn verify_corruption_safety(data: &[u8]) {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let bits = MaxBits::new(9 + selector % 8).unwrap();

    let mut source = ByteStream::new(payload);
    let mut sink = ByteStream::with_capacity(payload.len() * 2 + 10);
    compress(&mut sink, &mut source, bits);

    let mut compressed = sink.written().to_vec();
    let at = usize::from(selector) % compressed.len();
    compressed[at] ^= selector | 1;

    let mut packed = ByteStream::new(&compressed[..]);
    let mut verifier = Verifier::new(payload);
    let _ = decompress(&mut verifier, &mut packed);
}

fuzz_target!(|data: &[u8]| {
    // 1. Robustness: random noise must not crash the decompressor.
    verify_decompression_robustness(data);

    // 2. Correctness: valid data survives a compress-decompress cycle.
    verify_round_trip(data);

    // 3. Robustness: a corrupted valid stream must not crash it either.
    verify_corruption_safety(data);
});
