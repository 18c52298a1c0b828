//! # LZW round-trip harness
//!
//! `lzw_roundtrip` drives a byte-stream codec through every maximum symbol
//! width (9 to 16 bits), checks that decompression reproduces the input
//! exactly, and flags compressed output that outgrows its allotted headroom.
//!
//! Two optional modes harden the check against adversarial input:
//!
//! * **Fuzzing** corrupts roughly one compressed byte in 65536 with a
//!   deterministic generator. The decompressor must then fail cleanly or
//!   produce output the verifier rejects; it must never panic.
//! * **Exhaustive** mode repeats the sweep over a ladder of ever smaller
//!   windows of each file, trimming about 1% per step from alternating ends.
//!
//! The codec is reached only through the [`Codec`] trait, which pulls bytes
//! from a [`ByteSource`] and pushes them into a [`ByteSink`]. A variable-width
//! LZW codec, [`Lzw`], is bundled.
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//! use lzw_roundtrip::{Harness, HarnessConfig, Lzw};
//!
//! let mut report = Vec::new();
//! let mut harness = Harness::new(Lzw, HarnessConfig::default().with_quiet(true), &mut report);
//! harness.check_bytes(Path::new("greeting"), b"Hello world, hello world!").unwrap();
//!
//! let stats = harness.finish().unwrap();
//! assert_eq!(stats.tests_run, 8);
//! assert!(stats.is_clean());
//! ```

#![forbid(unsafe_code)]

pub mod cases;
pub mod codec;
pub mod compress;
pub mod decompress;
pub mod error;
pub mod fuzz;
pub mod harness;
pub mod input;
pub mod stream;
pub mod verify;

pub use cases::{MaxBits, MaxBitsSelection, TestCase, TruncationLadder};
pub use codec::{Codec, Lzw};
pub use compress::compress;
pub use decompress::decompress;
pub use error::{CodecError, HarnessError, SetupError};
pub use fuzz::{FuzzInjector, FuzzedSink};
pub use harness::{CaseOutcome, Harness, HarnessConfig, RunStatistics};
pub use stream::{ByteSink, ByteSource, ByteStream};
pub use verify::{VerificationResult, Verifier, VerifyFailure};
