//! Loading test files into memory under a size limit.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::SetupError;

/// Largest file accepted by default (1 GiB).
pub const DEFAULT_SIZE_LIMIT: u64 = 1 << 30;

/// Reads `path` fully.
///
/// Fails with a [`SetupError`] when the file cannot be opened, is not a
/// regular file, is empty, is larger than `limit`, cannot be allocated, or
/// comes up short while reading.
pub fn load_file(path: &Path, limit: u64) -> Result<Vec<u8>, SetupError> {
    let mut file = File::open(path).map_err(|source| SetupError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let size = match file.metadata() {
        Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
        _ => {
            return Err(SetupError::Size {
                path: path.to_path_buf(),
            });
        }
    };

    let too_big = || SetupError::TooBig {
        path: path.to_path_buf(),
        size,
    };

    if size > limit {
        return Err(too_big());
    }

    let len = usize::try_from(size).map_err(|_| too_big())?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| too_big())?;
    buffer.resize(len, 0);

    file.read_exact(&mut buffer)
        .map_err(|source| SetupError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), size, "loaded test file");
    Ok(buffer)
}
