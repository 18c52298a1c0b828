// Command-line argument parsing for the round-trip harness.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use lzw_roundtrip::fuzz::DEFAULT_SEED;
use lzw_roundtrip::input::DEFAULT_SIZE_LIMIT;
use lzw_roundtrip::{HarnessConfig, MaxBits, MaxBitsSelection};

/// Verify that files survive an LZW compress/decompress round trip at every
/// maximum symbol size.
#[derive(Parser, Debug)]
#[command(name = "lzw-roundtrip")]
#[command(version, about, long_about = None)]
#[command(after_help = "Shortcuts: -1 ... -8 test only max symbol size 9 ... 16, \
                        -0 cycles through all sizes (default).\n\
                        Exit status is the number of errors detected.")]
pub struct Cli {
    /// Files to test
    pub files: Vec<PathBuf>,

    /// Maximum symbol size to test (9-16), or 0 to cycle through all sizes
    #[arg(short = 'b', long = "max-bits", default_value = "0", value_parser = parse_max_bits)]
    pub max_bits: MaxBitsSelection,

    /// Fuzz test: randomly corrupt the compressed data
    #[arg(short = 'f', long = "fuzz")]
    pub fuzz: bool,

    /// Seed for the fuzz corruption generator (decimal or 0x-prefixed hex)
    #[arg(long = "fuzz-seed", value_parser = parse_seed)]
    pub fuzz_seed: Option<u64>,

    /// Exhaustive test: repeat on progressively truncated copies of each file
    #[arg(short = 'e', long = "exhaustive")]
    pub exhaustive: bool,

    /// Quiet mode: only report failures and the final summary
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Compressed growth allowed before a case counts as inflated, in percent
    #[arg(long = "headroom-percent", default_value_t = 100)]
    pub headroom_percent: usize,

    /// Extra sink bytes allowed on top of the percentage headroom
    #[arg(long = "headroom-slack", default_value_t = 10)]
    pub headroom_slack: usize,

    /// Files larger than this many bytes are skipped
    #[arg(long = "size-limit", default_value_t = DEFAULT_SIZE_LIMIT)]
    pub size_limit: u64,
}

impl Cli {
    /// Parses the process arguments, accepting the `-0` ... `-8` shortcuts.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(expand_level_flags(args))
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::default()
            .with_max_bits(self.max_bits)
            .with_fuzz(self.fuzz)
            .with_fuzz_seed(self.fuzz_seed.unwrap_or(DEFAULT_SEED))
            .with_exhaustive(self.exhaustive)
            .with_quiet(self.quiet)
            .with_size_limit(self.size_limit)
            .with_headroom(self.headroom_percent, self.headroom_slack)
    }
}

/// Rewrites `-N` (N in 0..=8) into `--max-bits=M`, where 0 keeps cycling and
/// 1..=8 select 9..=16.
fn expand_level_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let level = arg
                .to_str()
                .and_then(|s| s.strip_prefix('-'))
                .filter(|rest| rest.len() == 1)
                .and_then(|rest| rest.parse::<u8>().ok())
                .filter(|level| *level <= 8);
            match level {
                Some(0) => OsString::from("--max-bits=0"),
                Some(level) => OsString::from(format!("--max-bits={}", level + 8)),
                None => arg,
            }
        })
        .collect()
}

fn parse_max_bits(s: &str) -> Result<MaxBitsSelection, String> {
    let bits: u8 = s.parse().map_err(|e| format!("invalid max bits {s:?}: {e}"))?;
    if bits == 0 {
        return Ok(MaxBitsSelection::Cycle);
    }
    MaxBits::new(bits)
        .map(MaxBitsSelection::Fixed)
        .ok_or_else(|| format!("max bits must be 0 or within 9-16, got {bits}"))
}

fn parse_seed(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid seed {s:?}: {e}"))
}
