use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a codec through the [`Codec`](crate::codec::Codec) boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Compressed stream is empty (missing header)")]
    MissingHeader,

    #[error("Invalid stream header byte {0:#04x}")]
    InvalidHeader(u8),

    #[error("Unexpected end of stream before end code")]
    UnexpectedEof,

    #[error("Code {code} is not defined (next free code is {next})")]
    InvalidCode { code: u32, next: u32 },

    #[error("Compressor rejected input: {0}")]
    Rejected(&'static str),
}

/// Reasons a file is skipped before any test case runs.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("can't open file {}!", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't get file size of {} (may be zero)!", path.display())]
    Size { path: PathBuf },

    #[error("file {} is too big!", path.display())]
    TooBig { path: PathBuf, size: u64 },

    #[error("file {} could not be read!", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Conditions that abort a harness run.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),
}
