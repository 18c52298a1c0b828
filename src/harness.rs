//! Drives a codec through every test case of every file and classifies the results.

use std::io::Write;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::cases::{self, MaxBitsSelection, TestCase};
use crate::codec::Codec;
use crate::error::{CodecError, HarnessError, SetupError};
use crate::fuzz::{DEFAULT_SEED, FuzzInjector, FuzzedSink};
use crate::input::{self, DEFAULT_SIZE_LIMIT};
use crate::stream::{ByteStream, sink_capacity};
use crate::verify::{VerificationResult, Verifier};

type Result<T> = core::result::Result<T, HarnessError>;

/// Settings for a harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub max_bits: MaxBitsSelection,
    /// Corrupt the compressed stream before decompressing it.
    pub fuzz: bool,
    pub fuzz_seed: u64,
    /// Also test the truncation ladder of every file.
    pub exhaustive: bool,
    /// Only report failures and the summary.
    pub quiet: bool,
    /// Files larger than this are skipped.
    pub size_limit: u64,
    /// Allowed compressed growth, in percent of the input, before a case counts as inflated.
    pub headroom_percent: usize,
    /// Extra bytes of sink capacity on top of `headroom_percent`.
    pub headroom_slack: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_bits: MaxBitsSelection::Cycle,
            fuzz: false,
            fuzz_seed: DEFAULT_SEED,
            exhaustive: false,
            quiet: false,
            size_limit: DEFAULT_SIZE_LIMIT,
            headroom_percent: 100,
            headroom_slack: 10,
        }
    }
}

impl HarnessConfig {
    #[must_use]
    pub const fn with_max_bits(mut self, max_bits: MaxBitsSelection) -> Self {
        self.max_bits = max_bits;
        self
    }

    #[must_use]
    pub const fn with_fuzz(mut self, fuzz: bool) -> Self {
        self.fuzz = fuzz;
        self
    }

    #[must_use]
    pub const fn with_fuzz_seed(mut self, seed: u64) -> Self {
        self.fuzz_seed = seed;
        self
    }

    #[must_use]
    pub const fn with_exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    #[must_use]
    pub const fn with_size_limit(mut self, limit: u64) -> Self {
        self.size_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_headroom(mut self, percent: usize, slack: usize) -> Self {
        self.headroom_percent = percent;
        self.headroom_slack = slack;
        self
    }

    /// Sink capacity for compressing `len` input bytes.
    #[must_use]
    pub const fn sink_capacity(&self, len: usize) -> usize {
        sink_capacity(len, self.headroom_percent, self.headroom_slack)
    }
}

/// Totals accumulated over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub files_checked: usize,
    pub files_skipped: usize,
    pub tests_run: usize,
    pub errors_found: usize,
    /// Input bytes of passing cases.
    pub total_input_bytes: u64,
    /// Compressed bytes of passing cases.
    pub total_output_bytes: u64,
}

impl RunStatistics {
    /// Cumulative compressed size as a percentage of the input.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        percent(self.total_output_bytes, self.total_input_bytes)
    }

    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.errors_found == 0
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// How a single test case ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed {
        input_bytes: usize,
        output_bytes: usize,
    },
    CompressFailed(CodecError),
    /// The compressed output did not fit the sink; decompression was skipped.
    Inflated { capacity: usize, wraps: usize },
    DecompressFailed(CodecError),
    VerifyFailed(VerificationResult),
}

impl CaseOutcome {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::Passed { .. })
    }
}

/// Runs test cases against a codec and writes a line-oriented report to `out`.
pub struct Harness<C, W> {
    codec: C,
    config: HarnessConfig,
    injector: FuzzInjector,
    stats: RunStatistics,
    out: W,
}

impl<C: Codec, W: Write> Harness<C, W> {
    pub fn new(codec: C, config: HarnessConfig, out: W) -> Self {
        let injector = if config.fuzz {
            FuzzInjector::with_seed(config.fuzz_seed)
        } else {
            FuzzInjector::disabled()
        };
        Self {
            codec,
            config,
            injector,
            stats: RunStatistics::default(),
            out,
        }
    }

    pub const fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub const fn injector(&self) -> &FuzzInjector {
        &self.injector
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Checks every file in `paths`, then writes the summary line.
    pub fn run<I, P>(&mut self, paths: I) -> Result<RunStatistics>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.check_file(path.as_ref())?;
        }
        self.finish()
    }

    /// Loads `path` and runs its case matrix. Setup failures skip the file.
    pub fn check_file(&mut self, path: &Path) -> Result<()> {
        match input::load_file(path, self.config.size_limit) {
            Ok(data) => self.check_bytes(path, &data),
            Err(err) => self.skip(&err),
        }
    }

    /// Runs the case matrix for in-memory `data` reported under `name`.
    pub fn check_bytes(&mut self, name: &Path, data: &[u8]) -> Result<()> {
        // One sink per file, sized for the largest window and reused for all cases.
        let Some(mut sink) = allocate_sink(self.config.sink_capacity(data.len())) else {
            return self.skip(&SetupError::TooBig {
                path: name.to_path_buf(),
                size: data.len() as u64,
            });
        };

        writeln!(self.out)?;
        self.stats.files_checked += 1;
        info!(file = %name.display(), size = data.len(), "checking file");

        let errors_before = self.stats.errors_found;
        for case in cases::generate(name, data.len(), self.config.max_bits, self.config.exhaustive) {
            let outcome = self.run_case(&case, data, &mut sink);
            self.record(&case, data.len(), &outcome)?;
        }

        info!(
            file = %name.display(),
            errors = self.stats.errors_found - errors_before,
            "file done"
        );
        Ok(())
    }

    /// Runs one case: compress, check for inflation, decompress into a verifier.
    ///
    /// `sink` is reset and resized for the case; statistics are not touched.
    pub fn run_case(
        &mut self,
        case: &TestCase<'_>,
        data: &[u8],
        sink: &mut ByteStream,
    ) -> CaseOutcome {
        let input = &data[case.window.clone()];
        sink.reset_with_capacity(self.config.sink_capacity(input.len()));

        let mut source = ByteStream::new(input);
        let compressed = {
            let mut fuzzed = FuzzedSink::new(&mut *sink, &mut self.injector);
            self.codec.compress(&mut fuzzed, &mut source, case.max_bits)
        };
        if let Err(err) = compressed {
            return CaseOutcome::CompressFailed(err);
        }

        if sink.has_wrapped() {
            return CaseOutcome::Inflated {
                capacity: sink.capacity(),
                wraps: sink.wrap_count(),
            };
        }

        let mut packed = ByteStream::new(sink.written());
        let mut verifier = Verifier::new(input);
        if let Err(err) = self.codec.decompress(&mut verifier, &mut packed) {
            return CaseOutcome::DecompressFailed(err);
        }

        let result = verifier.finish();
        if result.is_success() {
            CaseOutcome::Passed {
                input_bytes: input.len(),
                output_bytes: sink.position(),
            }
        } else {
            CaseOutcome::VerifyFailed(result)
        }
    }

    /// Writes the summary line and returns the final statistics.
    pub fn finish(&mut self) -> Result<RunStatistics> {
        let s = self.stats;
        writeln!(
            self.out,
            "\n{} errors detected in {} files ({} skipped), {} tests, {} bytes --> {} bytes, {:.2}%\n",
            s.errors_found,
            s.files_checked,
            s.files_skipped,
            s.tests_run,
            s.total_input_bytes,
            s.total_output_bytes,
            s.ratio()
        )?;
        self.out.flush()?;
        Ok(s)
    }

    fn skip(&mut self, err: &SetupError) -> Result<()> {
        warn!(error = %err, "skipping file");
        writeln!(self.out, "\n{err}")?;
        self.stats.files_skipped += 1;
        Ok(())
    }

    fn record(&mut self, case: &TestCase<'_>, file_len: usize, outcome: &CaseOutcome) -> Result<()> {
        self.stats.tests_run += 1;
        if outcome.is_error() {
            self.stats.errors_found += 1;
        }
        debug!(
            file = %case.filename.display(),
            max_bits = case.max_bits.get(),
            window = ?case.window,
            ?outcome,
            "case finished"
        );

        let file = case.filename.display();
        let bits = case.max_bits;
        let window = if case.is_truncated(file_len) {
            format!(" [bytes {}..{}]", case.window.start, case.window.end)
        } else {
            String::new()
        };

        match outcome {
            CaseOutcome::Passed {
                input_bytes,
                output_bytes,
            } => {
                self.stats.total_input_bytes += *input_bytes as u64;
                self.stats.total_output_bytes += *output_bytes as u64;
                if !self.config.quiet {
                    writeln!(
                        self.out,
                        "file {file}{window}, maxbits = {bits:>2}: {input_bytes} bytes --> {output_bytes} bytes, {:.2}%",
                        percent(*output_bytes as u64, *input_bytes as u64)
                    )?;
                }
            }
            CaseOutcome::CompressFailed(err) => writeln!(
                self.out,
                "compress returned error on file {file}{window}, maxbits = {bits}: {err}"
            )?,
            CaseOutcome::Inflated { .. } => writeln!(
                self.out,
                "over {}% inflation on file {file}{window}, maxbits = {bits}!",
                self.config.headroom_percent
            )?,
            CaseOutcome::DecompressFailed(err) => writeln!(
                self.out,
                "decompress returned error on file {file}{window}, maxbits = {bits}: {err}"
            )?,
            CaseOutcome::VerifyFailed(result) => {
                for failure in result.failures() {
                    writeln!(
                        self.out,
                        "{failure} on file {file}{window}, maxbits = {bits}"
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Allocates a zeroed sink, or `None` if the allocation fails.
fn allocate_sink(capacity: usize) -> Option<ByteStream> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(capacity).ok()?;
    buffer.resize(capacity, 0);
    Some(ByteStream::new(buffer))
}
