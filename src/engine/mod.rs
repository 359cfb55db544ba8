// src/engine/mod.rs

//! Goal orchestration engine for scriptgate.
//!
//! This module ties together:
//! - goal kinds and their defaults ([`goal`])
//! - the in-memory "already executed" markers ([`markers`])
//! - per-goal state file locations ([`state`])
//! - the orchestrator that walks one goal through its stages
//!   ([`orchestrator`])

use std::fmt;

use crate::exec::CommandResult;

pub mod goal;
pub mod markers;
pub mod orchestrator;
pub mod state;

pub use goal::{GoalCapabilities, GoalKind, ScriptInvocation};
pub use markers::{Claim, ExecutionMarkers, MarkerClaim, MarkerKey, MarkerState};
pub use orchestrator::{Orchestrator, PreparedGoal, ToolVersion};
pub use state::{encode_script, state_file_path, GoalState, STATE_DIR};

/// Why a goal finished without launching its script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `skip`, `skip_tests` or the goal's own `skip` flag.
    Disabled,
    /// Same script already ran in the same directory during this build.
    AlreadyExecuted,
    /// Tracked inputs match the stored fingerprint.
    NoChanges,
    /// Script absent from `package.json` and `fail_on_missing_script = false`.
    MissingScript,
}

/// Terminal result of a goal that did not fail the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalOutcome {
    Skipped(SkipReason),
    /// The script ran. A non-zero status here means the failure was
    /// tolerated.
    Executed(CommandResult),
}

impl GoalOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, GoalOutcome::Skipped(_))
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            GoalOutcome::Skipped(reason) => Some(*reason),
            GoalOutcome::Executed(_) => None,
        }
    }

    pub fn result(&self) -> Option<&CommandResult> {
        match self {
            GoalOutcome::Executed(result) => Some(result),
            GoalOutcome::Skipped(_) => None,
        }
    }
}

/// Stages a goal moves through, in order. Logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStage {
    Requested,
    Resolved,
    Skipped,
    AlreadyExecuted,
    CheckingFingerprint,
    UpToDate,
    CheckingScript,
    MissingScript,
    AcquiringLock,
    Running,
    Recording,
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStage::Requested => "requested",
            ExecutionStage::Resolved => "resolved",
            ExecutionStage::Skipped => "skipped",
            ExecutionStage::AlreadyExecuted => "already-executed",
            ExecutionStage::CheckingFingerprint => "checking-fingerprint",
            ExecutionStage::UpToDate => "up-to-date",
            ExecutionStage::CheckingScript => "checking-script",
            ExecutionStage::MissingScript => "missing-script",
            ExecutionStage::AcquiringLock => "acquiring-lock",
            ExecutionStage::Running => "running",
            ExecutionStage::Recording => "recording",
            ExecutionStage::Persisting => "persisting",
            ExecutionStage::Done => "done",
            ExecutionStage::Failed => "failed",
        };
        f.write_str(s)
    }
}
