// src/fingerprint/mod.rs

//! Input tracking for incremental goals.
//!
//! This module is responsible for:
//! - Compiling include/exclude glob patterns into a concrete file set.
//! - Hashing each file of that set into a [`FingerprintSnapshot`].
//! - Persisting snapshots between builds and comparing them.
//!
//! It does **not** decide whether a goal runs; the orchestrator only uses
//! [`FingerprintStore::unchanged`] as its skip signal.

use std::collections::BTreeMap;

pub mod assets;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod store;

/// Normalized absolute path -> hex content digest, ordered by path.
pub type FingerprintSnapshot = BTreeMap<String, String>;

pub use hash::{compute_file_hash, compute_snapshot, DIGEST_HEX_LEN};
pub use path_utils::normalize_absolute;
pub use patterns::{FileSetResolver, PatternLayers, PatternSet};
pub use store::FingerprintStore;
