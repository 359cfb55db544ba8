// src/lock.rs

//! Workspace lock shared by every goal of a build.
//!
//! Install-class goals rewrite the shared dependency tree in place, so they
//! take the lock exclusively. Build/test-class goals only read that tree and
//! write per-module outputs, so they share it. The lock is a
//! `tokio::sync::RwLock`, whose FIFO fairness keeps a waiting writer from
//! being starved by a stream of readers.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

use crate::types::LockStrategy;

static GLOBAL_LOCK: OnceLock<WorkspaceLock> = OnceLock::new();

/// Cheaply clonable handle on one read/write lock.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceLock {
    inner: Arc<RwLock<()>>,
}

impl WorkspaceLock {
    /// A fresh, independent lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide lock.
    pub fn global() -> Self {
        GLOBAL_LOCK.get_or_init(WorkspaceLock::new).clone()
    }

    /// Wait for the lock in the requested mode.
    ///
    /// The returned token releases the lock when dropped.
    pub async fn acquire(&self, strategy: LockStrategy) -> LockToken {
        debug!(%strategy, "acquiring workspace lock");
        let token = match strategy {
            LockStrategy::Read => LockToken::Read(Arc::clone(&self.inner).read_owned().await),
            LockStrategy::Write => LockToken::Write(Arc::clone(&self.inner).write_owned().await),
            LockStrategy::None => LockToken::Unlocked,
        };
        debug!(%strategy, "workspace lock acquired");
        token
    }
}

/// Proof of holding the workspace lock (or of not needing it).
#[derive(Debug)]
pub enum LockToken {
    Read(OwnedRwLockReadGuard<()>),
    Write(OwnedRwLockWriteGuard<()>),
    Unlocked,
}

impl LockToken {
    pub fn strategy(&self) -> LockStrategy {
        match self {
            LockToken::Read(_) => LockStrategy::Read,
            LockToken::Write(_) => LockStrategy::Write,
            LockToken::Unlocked => LockStrategy::None,
        }
    }
}

/// Pick the strategy for `goal`: explicit override, else the goal's
/// default, else `None`. Goal names are matched case-insensitively.
pub fn resolve_strategy(
    goal: &str,
    overrides: &BTreeMap<String, LockStrategy>,
    default: Option<LockStrategy>,
) -> LockStrategy {
    overrides
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(goal))
        .map(|(_, strategy)| *strategy)
        .or(default)
        .unwrap_or(LockStrategy::None)
}
