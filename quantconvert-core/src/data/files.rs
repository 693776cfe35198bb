//! File helpers used around the conversion steps: delete-if-exists, cheap
//! line counting for progress totals, and temp-path reservation.

use crate::error::PipelineError;
use rand::seq::SliceRandom;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read size for [`count_lines`].
pub const LINE_COUNT_CHUNK: usize = 1024 * 1024;

const TEMP_NAME_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789_";
const TEMP_NAME_LEN: usize = 8;
const TEMP_NAME_ATTEMPTS: usize = 100;

/// Delete a file if it exists. A missing file is not an error; every other
/// failure (permissions, path is a directory, ...) is returned.
pub fn safe_delete(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("removed '{}'", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Count `\n` bytes in a file, reading it in 1 MiB chunks.
///
/// Memory use is bounded no matter how large the file is. The result counts
/// newlines, not records: a final line without a terminator is not counted.
pub fn count_lines(path: &Path) -> io::Result<u64> {
    count_lines_with_chunk(path, LINE_COUNT_CHUNK)
}

pub(crate) fn count_lines_with_chunk(path: &Path, chunk_size: usize) -> io::Result<u64> {
    let mut file = File::open(path)?;
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut lines = 0u64;
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        lines += buf[..n].iter().filter(|&&b| b == b'\n').count() as u64;
    }
    Ok(lines)
}

/// `{destination}.tmp`, the sibling a converter writes into before the
/// final rename.
pub fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write a CSV through a staging file and rename it onto `destination` only
/// once `write` has finished and the writer is flushed. On any failure the
/// staging file is removed and `destination` is left untouched.
pub(crate) fn write_staged<F>(destination: &Path, write: F) -> Result<usize, PipelineError>
where
    F: FnOnce(&mut csv::Writer<File>) -> Result<usize, PipelineError>,
{
    let staging = staging_path(destination);
    let written = (|| -> Result<usize, PipelineError> {
        let mut writer = csv::Writer::from_path(&staging)?;
        let rows = write(&mut writer)?;
        writer.flush()?;
        Ok(rows)
    })()
    .and_then(|rows| {
        fs::rename(&staging, destination)?;
        Ok(rows)
    });

    if written.is_err() {
        if let Err(e) = safe_delete(&staging) {
            warn!("could not remove staging file '{}': {e}", staging.display());
        }
    }
    written
}

/// Reserve a unique file name in the system temp directory.
///
/// Nothing is created on disk; the caller owns creation and cleanup.
pub fn temp_path() -> PathBuf {
    let dir = std::env::temp_dir();
    let mut rng = rand::thread_rng();
    let mut candidate = dir.join(random_name(&mut rng));
    for _ in 1..TEMP_NAME_ATTEMPTS {
        if !candidate.exists() {
            break;
        }
        candidate = dir.join(random_name(&mut rng));
    }
    debug!("temporary file name created: '{}'", candidate.display());
    candidate
}

fn random_name<R: rand::Rng>(rng: &mut R) -> String {
    (0..TEMP_NAME_LEN)
        .filter_map(|_| TEMP_NAME_CHARS.choose(rng).map(|&b| b as char))
        .collect()
}
