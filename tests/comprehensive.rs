use std::path::Path;

use lzw_roundtrip::{
    ByteSink, ByteSource, ByteStream, CaseOutcome, Codec, CodecError, Harness, HarnessConfig,
    Lzw, MaxBits, MaxBitsSelection, TestCase, TruncationLadder, Verifier, VerifyFailure,
    compress, decompress,
};
use proptest::prelude::*;

// --- Helpers ---

/// Compresses `input` at `bits` and returns the compressed bytes.
fn compress_to_vec(input: &[u8], bits: u8) -> Vec<u8> {
    let mut source = ByteStream::new(input);
    let mut sink = ByteStream::with_capacity(input.len() * 2 + 16);
    compress(&mut sink, &mut source, MaxBits::new(bits).unwrap());
    assert!(!sink.has_wrapped(), "test sink too small");
    sink.written().to_vec()
}

/// Performs a full compress-decompress cycle and asserts bit-exact reconstruction.
#[track_caller]
fn assert_round_trip(input: &[u8], bits: u8) {
    let compressed = compress_to_vec(input, bits);
    let mut packed = ByteStream::new(&compressed[..]);
    let mut verifier = Verifier::new(input);
    match decompress(&mut verifier, &mut packed) {
        Ok(()) => {
            let result = verifier.finish();
            assert!(result.is_success(), "round trip at {bits} bits: {result:?}");
        }
        Err(e) => panic!("Decompression failed during round-trip at {bits} bits: {e:?}"),
    }
}

/// Deterministic text-like data with plenty of repeats.
fn generate_text(size: usize) -> Vec<u8> {
    let text = b"The quick brown fox jumps over the lazy dog. ";
    text.iter().copied().cycle().take(size).collect()
}

/// Deterministic high-entropy data (LCG).
fn generate_random(size: usize) -> Vec<u8> {
    let mut seed: u64 = 0xDEAD_BEEF;
    (0..size)
        .map(|_| {
            seed = (seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223)) & 0xFFFF_FFFF;
            (seed >> 24) as u8
        })
        .collect()
}

/// Seed whose first fuzzed byte lands exactly on `state`.
fn seed_reaching(state: u64) -> u64 {
    let mut inv: u64 = 15;
    for _ in 0..6 {
        inv = inv.wrapping_mul(2u64.wrapping_sub(15u64.wrapping_mul(inv)));
    }
    let unmix = |s: u64| (s ^ 1).wrapping_mul(inv);
    unmix(unmix(unmix(state)))
}

fn single(bits: u8) -> HarnessConfig {
    HarnessConfig::default().with_max_bits(MaxBitsSelection::Fixed(MaxBits::new(bits).unwrap()))
}

fn report<C: Codec>(harness: Harness<C, Vec<u8>>) -> String {
    String::from_utf8(harness.into_output()).unwrap()
}

/// Copies bytes through unchanged unless told to misbehave.
#[derive(Default)]
struct Tamper {
    compress_error: Option<CodecError>,
    decompress_error: Option<CodecError>,
    /// Extra zero bytes appended on compress.
    pad: usize,
    /// Bytes dropped from the end on decompress.
    drop_tail: usize,
    /// Position flipped on decompress.
    flip_at: Option<usize>,
    decompress_calls: usize,
}

impl Codec for Tamper {
    fn compress(
        &mut self,
        sink: &mut dyn ByteSink,
        source: &mut dyn ByteSource,
        _max_bits: MaxBits,
    ) -> Result<(), CodecError> {
        while let Some(b) = source.pull() {
            sink.push(b);
        }
        if let Some(err) = self.compress_error.clone() {
            return Err(err);
        }
        for _ in 0..self.pad {
            sink.push(0);
        }
        Ok(())
    }

    fn decompress(
        &mut self,
        sink: &mut dyn ByteSink,
        source: &mut dyn ByteSource,
    ) -> Result<(), CodecError> {
        self.decompress_calls += 1;
        if let Some(err) = self.decompress_error.clone() {
            return Err(err);
        }
        let mut bytes = Vec::new();
        while let Some(b) = source.pull() {
            bytes.push(b);
        }
        bytes.truncate(bytes.len().saturating_sub(self.drop_tail));
        if let Some(at) = self.flip_at {
            bytes[at] ^= 0xFF;
        }
        for b in bytes {
            sink.push(b);
        }
        Ok(())
    }
}

fn case(window: core::ops::Range<usize>) -> TestCase<'static> {
    TestCase {
        filename: Path::new("case.bin"),
        max_bits: MaxBits::MIN,
        window,
    }
}

// --- Codec Round Trips (Tests 1-7) ---

/// Test: Empty input survives every width.
#[test]
fn t01_empty_input() {
    for bits in 9..=16 {
        assert_round_trip(b"", bits);
    }
}

/// Test: Single byte input.
#[test]
fn t02_single_byte() {
    for bits in 9..=16 {
        assert_round_trip(b"A", bits);
    }
}

/// Test: Ten identical bytes at 9 bits pass as a harness case.
#[test]
fn t03_ten_a_at_nine_bits() {
    let data = b"AAAAAAAAAA";
    let mut h = Harness::new(Lzw, single(9), Vec::new());
    let mut sink = ByteStream::with_capacity(64);
    let outcome = h.run_case(&case(0..10), data, &mut sink);

    match outcome {
        CaseOutcome::Passed {
            input_bytes,
            output_bytes,
        } => {
            assert_eq!(input_bytes, 10);
            assert_eq!(output_bytes, sink.position());
        }
        other => panic!("expected a pass, got {other:?}"),
    }
    assert_round_trip(data, 9);
}

/// Test: Repeating text at every width.
#[test]
fn t04_text_every_width() {
    let input = generate_text(20_000);
    for bits in 9..=16 {
        assert_round_trip(&input, bits);
    }
}

/// Test: High-entropy data forces many table resets at small widths.
#[test]
fn t05_random_every_width() {
    let input = generate_random(70_000);
    for bits in 9..=16 {
        assert_round_trip(&input, bits);
    }
}

/// Test: Compression actually compresses repetitive data.
#[test]
fn t06_text_compresses() {
    let input = generate_text(50_000);
    for bits in 9..=16 {
        assert!(compress_to_vec(&input, bits).len() < input.len() / 2);
    }
}

/// Test: Dropping the final byte loses the end code.
#[test]
fn t07_truncated_stream_is_an_error() {
    let mut compressed = compress_to_vec(b"TOBEORNOTTOBEORTOBEORNOT", 12);
    compressed.pop();
    let mut packed = ByteStream::new(&compressed[..]);
    let mut out = ByteStream::with_capacity(64);
    assert_eq!(
        decompress(&mut out, &mut packed),
        Err(CodecError::UnexpectedEof)
    );
}

// --- Classification (Tests 8-16) ---

/// Test: Compressed output of exactly the sink capacity does not wrap.
#[test]
fn t08_exact_capacity_is_not_inflation() {
    // 6 input bytes -> capacity 6 + 6 + 10 = 22.
    let codec = Tamper {
        pad: 16,
        ..Tamper::default()
    };
    let mut h = Harness::new(codec, single(9), Vec::new());
    let mut sink = ByteStream::with_capacity(0);
    let outcome = h.run_case(&case(0..6), b"abcdef", &mut sink);
    assert_eq!(sink.capacity(), 22);
    assert!(!sink.has_wrapped());
    match outcome {
        CaseOutcome::VerifyFailed(result) => {
            assert_eq!(result.failures(), [VerifyFailure::Extra { surplus: 16 }]);
        }
        other => panic!("expected verify failure, got {other:?}"),
    }
}

/// Test: One byte past the capacity is an inflation error and skips decompression.
#[test]
fn t09_inflation_by_one_byte() {
    let codec = Tamper {
        pad: 17,
        ..Tamper::default()
    };
    let mut h = Harness::new(codec, single(9), Vec::new());
    h.check_bytes(Path::new("big.bin"), b"abcdef").unwrap();

    let stats = *h.stats();
    assert_eq!(stats.tests_run, 1);
    assert_eq!(stats.errors_found, 1);
    assert_eq!(stats.total_input_bytes, 0);
    assert_eq!(stats.total_output_bytes, 0);

    let text = report(h);
    assert!(text.contains("over 100% inflation on file big.bin, maxbits = 9!"));
}

/// Test: The inflation outcome carries the wrap count.
#[test]
fn t10_inflation_outcome() {
    let mut codec = Tamper {
        pad: 17,
        ..Tamper::default()
    };
    let mut h = Harness::new(&mut codec, single(9), Vec::new());
    let mut sink = ByteStream::with_capacity(0);
    let outcome = h.run_case(&case(0..6), b"abcdef", &mut sink);
    assert_eq!(
        outcome,
        CaseOutcome::Inflated {
            capacity: 22,
            wraps: 1
        }
    );
    drop(h);
    assert_eq!(codec.decompress_calls, 0);
}

/// Test: A compressor failure is counted and nothing is accumulated.
#[test]
fn t11_compress_error() {
    let mut codec = Tamper {
        compress_error: Some(CodecError::Rejected("nope")),
        ..Tamper::default()
    };
    let mut h = Harness::new(&mut codec, HarnessConfig::default(), Vec::new());
    h.check_bytes(Path::new("c"), b"payload").unwrap();
    let stats = *h.stats();
    assert_eq!(stats.tests_run, 8);
    assert_eq!(stats.errors_found, 8);
    assert_eq!(stats.total_input_bytes, 0);
    let text = report(h);
    assert!(text.contains(
        "compress returned error on file c, maxbits = 16: Compressor rejected input: nope"
    ));
    assert_eq!(codec.decompress_calls, 0);
}

/// Test: A decompressor failure is counted.
#[test]
fn t12_decompress_error() {
    let codec = Tamper {
        decompress_error: Some(CodecError::UnexpectedEof),
        ..Tamper::default()
    };
    let mut h = Harness::new(codec, single(10), Vec::new());
    let mut sink = ByteStream::with_capacity(0);
    let outcome = h.run_case(&case(0..3), b"xyz", &mut sink);
    assert_eq!(
        outcome,
        CaseOutcome::DecompressFailed(CodecError::UnexpectedEof)
    );
}

/// Test: Output that stops early reports the deficit.
#[test]
fn t13_length_short() {
    let codec = Tamper {
        drop_tail: 2,
        ..Tamper::default()
    };
    let mut h = Harness::new(codec, single(9), Vec::new());
    h.check_bytes(Path::new("s"), b"abcdef").unwrap();
    assert_eq!(h.stats().errors_found, 1);
    let text = report(h);
    assert!(text.contains("decompression stopped 2 bytes short on file s, maxbits = 9"));
}

/// Test: No output at all reports both the empty output and the deficit.
#[test]
fn t14_no_output() {
    let codec = Tamper {
        drop_tail: usize::MAX,
        ..Tamper::default()
    };
    let mut h = Harness::new(codec, single(9), Vec::new());
    h.check_bytes(Path::new("z"), b"abc").unwrap();
    assert_eq!(h.stats().errors_found, 1);
    let text = report(h);
    assert!(text.contains("decompression produced no bytes on file z"));
    assert!(text.contains("decompression stopped 3 bytes short on file z"));
}

/// Test: Content mismatches report the count and first offset.
#[test]
fn t15_content_mismatch() {
    let codec = Tamper {
        flip_at: Some(3),
        ..Tamper::default()
    };
    let mut h = Harness::new(codec, single(9), Vec::new());
    h.check_bytes(Path::new("m"), b"abcdef").unwrap();
    let text = report(h);
    assert!(text.contains("1 byte data errors starting at index 3 on file m, maxbits = 9"));
}

/// Test: Short output and a mismatch are both reported, in order.
#[test]
fn t16_failures_co_occur() {
    let codec = Tamper {
        drop_tail: 1,
        flip_at: Some(0),
        ..Tamper::default()
    };
    let mut h = Harness::new(codec, single(9), Vec::new());
    let mut sink = ByteStream::with_capacity(0);
    let CaseOutcome::VerifyFailed(result) = h.run_case(&case(0..4), b"abcd", &mut sink) else {
        panic!("expected verify failure");
    };
    assert_eq!(
        result.failures(),
        [
            VerifyFailure::Short { missing: 1 },
            VerifyFailure::Mismatch { count: 1, first: 0 }
        ]
    );
}

// --- Reuse, Fuzzing & Modes (Tests 17-25) ---

/// Test: The same case on a reused sink gives the same outcome.
#[test]
fn t17_idempotent_reset() {
    let data = generate_text(3_000);
    let mut h = Harness::new(Lzw, single(11), Vec::new());
    let mut sink = ByteStream::with_capacity(0);
    let first = h.run_case(&case(100..2_900), &data, &mut sink);
    let first_bytes = sink.written().to_vec();
    let second = h.run_case(&case(100..2_900), &data, &mut sink);
    assert_eq!(first, second);
    assert_eq!(sink.written(), &first_bytes[..]);
    assert!(!first.is_error());
}

/// Test: A seed that corrupts the header byte turns the case into an error,
/// and the sweep carries on with the remaining widths.
#[test]
fn t18_fuzz_corrupting_header() {
    let seed = seed_reaching(0x0000_A500_1234_5678);
    let config = HarnessConfig::default().with_fuzz(true).with_fuzz_seed(seed);
    let data = b"AAAAAAAAAA";

    let pinned = config
        .clone()
        .with_max_bits(MaxBitsSelection::Fixed(MaxBits::MIN));
    let mut h = Harness::new(Lzw, pinned, Vec::new());
    let mut sink = ByteStream::with_capacity(0);
    let outcome = h.run_case(&case(0..10), data, &mut sink);
    assert_eq!(
        outcome,
        CaseOutcome::DecompressFailed(CodecError::InvalidHeader(0xA5))
    );
    assert_eq!(h.injector().injected(), 1);

    let mut h = Harness::new(Lzw, config, Vec::new());
    h.check_bytes(Path::new("aaa"), data).unwrap();
    assert_eq!(h.stats().tests_run, 8);
    assert!(h.stats().errors_found >= 1);
}

/// Test: Fuzzing a larger input never panics and every case is classified.
#[test]
fn t19_fuzz_safety() {
    let mut data = generate_text(150_000);
    data.extend(generate_random(150_000));
    let config = HarnessConfig::default().with_fuzz(true).with_quiet(true);
    let mut h = Harness::new(Lzw, config, Vec::new());
    h.check_bytes(Path::new("mixed"), &data).unwrap();
    let stats = h.finish().unwrap();
    assert_eq!(stats.tests_run, 8);
    assert_eq!(stats.files_checked, 1);
}

/// Test: Two runs with the same seed report identically.
#[test]
fn t20_fuzz_is_reproducible() {
    let data = generate_random(200_000);
    let run = || {
        let config = HarnessConfig::default().with_fuzz(true);
        let mut h = Harness::new(Lzw, config, Vec::new());
        h.check_bytes(Path::new("r"), &data).unwrap();
        h.finish().unwrap();
        let injected = h.injector().injected();
        (injected, report(h))
    };
    assert_eq!(run(), run());
}

/// Test: Exhaustive mode sweeps every ladder window cleanly.
#[test]
fn t21_exhaustive_clean() {
    let data = generate_text(500);
    let windows = TruncationLadder::new(data.len()).count();
    let config = HarnessConfig::default().with_exhaustive(true).with_quiet(true);
    let mut h = Harness::new(Lzw, config, Vec::new());
    h.check_bytes(Path::new("ladder"), &data).unwrap();
    let stats = *h.stats();
    assert_eq!(stats.tests_run, windows * 8);
    assert!(stats.is_clean());
}

/// Test: Files are loaded, skipped and summarized.
#[test]
fn t22_run_over_files() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.txt");
    let empty = dir.path().join("empty.bin");
    std::fs::write(&good, generate_text(1_000)).unwrap();
    std::fs::write(&empty, b"").unwrap();
    let missing = dir.path().join("missing.bin");

    let mut h = Harness::new(Lzw, HarnessConfig::default(), Vec::new());
    let stats = h
        .run([good.as_path(), empty.as_path(), missing.as_path(), dir.path()])
        .unwrap();

    assert_eq!(stats.files_checked, 1);
    assert_eq!(stats.files_skipped, 3);
    assert_eq!(stats.tests_run, 8);
    assert_eq!(stats.errors_found, 0);
    assert_eq!(stats.total_input_bytes, 8_000);

    let text = report(h);
    assert!(text.contains("can't get file size of"));
    assert!(text.contains("can't open file"));
    assert!(text.contains("0 errors detected in 1 files (3 skipped), 8 tests"));
}

/// Test: Files over the size limit are skipped.
#[test]
fn t23_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.bin");
    std::fs::write(&path, vec![7u8; 4096]).unwrap();
    let config = HarnessConfig::default().with_size_limit(4095);
    let mut h = Harness::new(Lzw, config, Vec::new());
    let stats = h.run([&path]).unwrap();
    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.tests_run, 0);
    assert!(report(h).contains("is too big!"));
}

/// Test: Summary totals and ratio.
#[test]
fn t24_summary_ratio() {
    let codec = Tamper::default();
    let mut h = Harness::new(codec, single(9), Vec::new());
    h.check_bytes(Path::new("copy"), b"0123456789").unwrap();
    let stats = h.finish().unwrap();
    assert_eq!(stats.total_input_bytes, 10);
    assert_eq!(stats.total_output_bytes, 10);
    assert!((stats.ratio() - 100.0).abs() < f64::EPSILON);
    let text = report(h);
    assert!(text.contains("file copy, maxbits =  9: 10 bytes --> 10 bytes, 100.00%"));
    assert!(text.contains("10 bytes --> 10 bytes, 100.00%\n"));
}

/// Test: A stricter headroom flags high-entropy data as inflated.
#[test]
fn t25_strict_headroom() {
    let data = generate_random(20_000);
    let config = single(12).with_headroom(0, 0);
    let mut h = Harness::new(Lzw, config, Vec::new());
    h.check_bytes(Path::new("noise"), &data).unwrap();
    assert_eq!(h.stats().errors_found, 1);
    assert!(report(h).contains("over 0% inflation on file noise, maxbits = 12!"));
}

// --- Properties ---

proptest! {
    #[test]
    fn prop_round_trip(data in proptest::collection::vec(any::<u8>(), 0..2048), bits in 9u8..=16) {
        let compressed = compress_to_vec(&data, bits);
        let mut packed = ByteStream::new(&compressed[..]);
        let mut verifier = Verifier::new(&data);
        prop_assert!(decompress(&mut verifier, &mut packed).is_ok());
        prop_assert!(verifier.finish().is_success());
    }

    #[test]
    fn prop_ladder_terminates(size in 2usize..200_000) {
        let windows: Vec<_> = TruncationLadder::new(size).collect();
        prop_assert_eq!(windows[0].clone(), 0..size);
        for pair in windows.windows(2) {
            prop_assert!(pair[1].len() < pair[0].len());
            prop_assert!(pair[1].start >= pair[0].start && pair[1].end <= pair[0].end);
        }
        let last = windows.last().unwrap().len();
        prop_assert!(last <= (size / 100).max(1));
    }

    #[test]
    fn prop_one_wrap_per_crossing(capacity in 1usize..512, pushes in 0usize..2048) {
        let mut sink = ByteStream::with_capacity(capacity);
        for i in 0..pushes {
            sink.push(i as u8);
        }
        let expected = if pushes == 0 { 0 } else { (pushes - 1) / capacity };
        prop_assert_eq!(sink.wrap_count(), expected);
    }

    #[test]
    fn prop_decompress_arbitrary_input(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let mut packed = ByteStream::new(&data[..]);
        let mut verifier = Verifier::new(&[]);
        let _ = decompress(&mut verifier, &mut packed);
    }

    #[test]
    fn prop_corrupted_stream_is_safe(
        data in proptest::collection::vec(any::<u8>(), 1..1024),
        bits in 9u8..=16,
        pos in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let mut compressed = compress_to_vec(&data, bits);
        let at = pos.index(compressed.len());
        compressed[at] ^= mask;
        let mut packed = ByteStream::new(&compressed[..]);
        let mut verifier = Verifier::new(&data);
        let _ = decompress(&mut verifier, &mut packed);
        let result = verifier.finish();
        prop_assert!(result.bytes_checked <= data.len());
    }
}
