// src/engine/markers.rs

//! In-memory "already executed" markers, shared by every goal of a build.
//!
//! A marker is keyed by working directory and resolved script. Checking and
//! claiming happen under one mutex, so two concurrent goals resolving to the
//! same pair never both run it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKey {
    pub working_dir: PathBuf,
    pub script: String,
}

impl MarkerKey {
    pub fn new(working_dir: impl Into<PathBuf>, script: impl Into<String>) -> Self {
        Self {
            working_dir: working_dir.into(),
            script: script.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    InProgress,
    Done { passed: bool },
}

/// Result of [`ExecutionMarkers::try_claim`].
#[derive(Debug)]
pub enum Claim {
    /// The caller owns the pair and must run it.
    Acquired(MarkerClaim),
    /// A previous run of the pair passed.
    AlreadyExecuted,
    /// Another goal is running the pair right now.
    InProgress,
}

#[derive(Debug, Default)]
pub struct ExecutionMarkers {
    entries: Mutex<HashMap<MarkerKey, MarkerState>>,
}

impl ExecutionMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<MarkerKey, MarkerState>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Atomically check the marker for `key` and claim it when free.
    ///
    /// Free means never seen, or last run failed.
    pub fn try_claim(self: &Arc<Self>, key: MarkerKey) -> Claim {
        let mut entries = self.entries();
        match entries.get(&key) {
            Some(MarkerState::Done { passed: true }) => Claim::AlreadyExecuted,
            Some(MarkerState::InProgress) => Claim::InProgress,
            Some(MarkerState::Done { passed: false }) | None => {
                entries.insert(key.clone(), MarkerState::InProgress);
                debug!(dir = ?key.working_dir, script = %key.script, "claimed execution marker");
                Claim::Acquired(MarkerClaim {
                    markers: Arc::clone(self),
                    key,
                    finished: false,
                })
            }
        }
    }

    pub fn state(&self, key: &MarkerKey) -> Option<MarkerState> {
        self.entries().get(key).copied()
    }

    /// True when a run of `key` passed.
    pub fn has_executed(&self, key: &MarkerKey) -> bool {
        self.state(key) == Some(MarkerState::Done { passed: true })
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Ownership of one marker while its script is being evaluated.
///
/// Dropping the claim without [`record`](Self::record) (skip, config error,
/// launch failure) gives the marker back as if nothing happened.
#[derive(Debug)]
pub struct MarkerClaim {
    markers: Arc<ExecutionMarkers>,
    key: MarkerKey,
    finished: bool,
}

impl MarkerClaim {
    pub fn key(&self) -> &MarkerKey {
        &self.key
    }

    /// Store the outcome of the run.
    pub fn record(mut self, passed: bool) {
        self.markers
            .entries()
            .insert(self.key.clone(), MarkerState::Done { passed });
        self.finished = true;
        debug!(script = %self.key.script, passed, "recorded execution marker");
    }
}

impl Drop for MarkerClaim {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut entries = self.markers.entries();
        if entries.get(&self.key) == Some(&MarkerState::InProgress) {
            entries.remove(&self.key);
        }
    }
}
