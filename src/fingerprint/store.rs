use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{Result, ScriptgateError};
use crate::fingerprint::hash::compute_snapshot;
use crate::fingerprint::FingerprintSnapshot;
use crate::fs::FileSystem;

/// Separator between path and digest in the state file.
///
/// The file format is a simple line-based mapping:
///
/// ```text
/// /abs/path/to/file_1::hex_digest_1
/// /abs/path/to/file_2::hex_digest_2
/// ```
pub const ENTRY_SEPARATOR: &str = "::";

/// Computes, persists and compares fingerprint snapshots.
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    fs: Arc<dyn FileSystem>,
}

impl FingerprintStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Hash every file of `files`. Vanished files are omitted.
    pub fn compute_snapshot<I, P>(&self, files: I) -> FingerprintSnapshot
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        compute_snapshot(self.fs.as_ref(), files)
    }

    /// Load the snapshot written by the previous tracked run.
    ///
    /// A missing or empty file means "never run" and yields an empty
    /// snapshot. Lines are split on the first separator; lines without one
    /// are ignored.
    pub fn load_previous(&self, state_file: &Path) -> Result<FingerprintSnapshot> {
        let mut snapshot = FingerprintSnapshot::new();

        if !self.fs.exists(state_file) {
            debug!(state_file = ?state_file, "no previous fingerprint state");
            return Ok(snapshot);
        }

        let contents = self
            .fs
            .read_to_string(state_file)
            .map_err(|e| ScriptgateError::state_file(state_file, e))?;

        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once(ENTRY_SEPARATOR) {
                Some((path, digest)) => {
                    snapshot.insert(path.to_string(), digest.trim().to_string());
                }
                None => debug!(line = %line, "ignoring malformed fingerprint line"),
            }
        }

        debug!(
            state_file = ?state_file,
            entries = snapshot.len(),
            "loaded previous fingerprint state"
        );
        Ok(snapshot)
    }

    /// Replace the state file with `snapshot`.
    ///
    /// The previous file is always deleted first; an empty snapshot leaves no
    /// file behind. The parent directory is created as needed.
    pub fn persist(&self, state_file: &Path, snapshot: &FingerprintSnapshot) -> Result<()> {
        self.fs
            .remove_file(state_file)
            .map_err(|e| ScriptgateError::state_file(state_file, e))?;

        if snapshot.is_empty() {
            debug!(state_file = ?state_file, "empty snapshot; state file removed");
            return Ok(());
        }

        if let Some(parent) = state_file.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| ScriptgateError::state_file(state_file, e))?;
        }

        let mut contents = String::new();
        for (path, digest) in snapshot {
            contents.push_str(path);
            contents.push_str(ENTRY_SEPARATOR);
            contents.push_str(digest);
            contents.push('\n');
        }

        self.fs
            .write(state_file, contents.as_bytes())
            .map_err(|e| ScriptgateError::state_file(state_file, e))?;

        info!(
            state_file = ?state_file,
            entries = snapshot.len(),
            "stored fingerprint state"
        );
        Ok(())
    }

    /// True when both snapshots track the same files with the same digests.
    pub fn unchanged(previous: &FingerprintSnapshot, current: &FingerprintSnapshot) -> bool {
        previous.len() == current.len()
            && previous
                .iter()
                .all(|(path, digest)| current.get(path) == Some(digest))
    }
}
