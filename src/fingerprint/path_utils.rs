// src/fingerprint/path_utils.rs

//! Utility functions for path handling in fingerprinting.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute (relative to the current directory) and remove `.`
/// and `..` components lexically.
///
/// Symlinks are not resolved: two spellings of the same directory that only
/// differ by `.`/`..` map to the same key, which is what the state file and
/// the execution markers need.
pub fn normalize_absolute(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if `path` is not below `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

/// Lexical form of a relative directory setting as the resolver sees it:
/// `./out/` and `out` both become `out`. `.` alone becomes the empty string.
pub fn normalize_relative(path: &str) -> String {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
