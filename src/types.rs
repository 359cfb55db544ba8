use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Concurrency discipline applied to a goal while its script runs.
///
/// - `Read`: shared access to the workspace; any number of readers may hold
///   the lock together.
/// - `Write`: exclusive access; excludes readers and other writers.
/// - `None`: the workspace lock is not touched at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStrategy {
    Read,
    Write,
    None,
}

impl Default for LockStrategy {
    fn default() -> Self {
        LockStrategy::None
    }
}

impl FromStr for LockStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "read" => Ok(LockStrategy::Read),
            "write" => Ok(LockStrategy::Write),
            "none" => Ok(LockStrategy::None),
            other => Err(format!(
                "invalid lock strategy: {other} (expected \"read\", \"write\" or \"none\")"
            )),
        }
    }
}

impl fmt::Display for LockStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LockStrategy::Read => "read",
            LockStrategy::Write => "write",
            LockStrategy::None => "none",
        };
        f.write_str(s)
    }
}

/// Package-manager client selection as written in the config.
///
/// `Auto` inspects the working directory for lock files (see
/// [`crate::manifest::detect_client`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientSetting {
    Auto,
    Npm,
    Yarn,
    Pnpm,
}

impl Default for ClientSetting {
    fn default() -> Self {
        ClientSetting::Auto
    }
}

/// A concrete package-manager client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Client {
    Npm,
    Yarn,
    Pnpm,
}

impl Client {
    /// Default executable name for this client.
    pub fn executable(&self) -> &'static str {
        match self {
            Client::Npm => "npm",
            Client::Yarn => "yarn",
            Client::Pnpm => "pnpm",
        }
    }

    /// Commands the client understands natively, i.e. that must *not* be
    /// prefixed with `run`.
    pub fn default_standard_commands(&self) -> &'static [&'static str] {
        match self {
            Client::Npm => &[
                "install", "ci", "test", "publish", "start", "stop", "restart", "prune",
            ],
            Client::Yarn => &["install", "test", "publish", "start", "pack", "prune"],
            Client::Pnpm => &["install", "test", "publish", "start", "prune"],
        }
    }
}

impl FromStr for Client {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "npm" => Ok(Client::Npm),
            "yarn" => Ok(Client::Yarn),
            "pnpm" => Ok(Client::Pnpm),
            other => Err(format!(
                "unknown client: {other} (expected \"npm\", \"yarn\" or \"pnpm\")"
            )),
        }
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}
