use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::{debug, warn};

use crate::fingerprint::path_utils::normalize_absolute;
use crate::fingerprint::FingerprintSnapshot;
use crate::fs::FileSystem;

/// Width of a digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("reading file for hashing: {:?}", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Build a snapshot of the given files, keyed by normalized absolute path.
///
/// Files that disappeared between enumeration and hashing are left out of
/// the snapshot. Any other failure to read a source file is logged and the
/// file is left out as well; only the state file itself is allowed to fail
/// a goal.
pub fn compute_snapshot<I, P>(fs: &dyn FileSystem, files: I) -> FingerprintSnapshot
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut snapshot = FingerprintSnapshot::new();

    for path in files {
        let path = path.as_ref();
        match compute_file_hash(fs, path) {
            Ok(digest) => {
                let key = normalize_absolute(path).to_string_lossy().into_owned();
                snapshot.insert(key, digest);
            }
            Err(err) if !fs.exists(path) => {
                debug!(path = ?path, error = %err, "file vanished before hashing; omitted");
            }
            Err(err) => {
                warn!(path = ?path, error = %err, "cannot hash file; omitted from snapshot");
            }
        }
    }

    debug!(entries = snapshot.len(), "computed fingerprint snapshot");
    snapshot
}
