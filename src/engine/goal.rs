// src/engine/goal.rs

//! Goal kinds and the defaults each one brings along.

use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, ScriptgateError};
use crate::fingerprint::assets;
use crate::types::LockStrategy;

/// A named build phase that maps to one client script invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GoalKind {
    Install,
    /// Dependency install that runs before the host's clean phase.
    PreClean,
    Clean,
    Bower,
    Lint,
    Prepare,
    Build,
    Package,
    Test,
    TestE2e,
    Verify,
    Start,
    Publish,
    /// Any other name: runs the script of the same name.
    Custom(String),
}

/// Everything the orchestrator needs to know about a goal kind before
/// configuration is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalCapabilities {
    pub name: String,
    pub default_script: String,
    pub default_lock: Option<LockStrategy>,
    pub default_includes: Vec<String>,
    pub default_excludes: Vec<String>,
    /// Talks to a registry; refused in offline mode.
    pub requires_network: bool,
    /// Can skip itself when its inputs are unchanged.
    pub incremental: bool,
    /// Honors `skip_tests`.
    pub test_class: bool,
}

impl GoalKind {
    pub fn name(&self) -> &str {
        match self {
            GoalKind::Install => "install",
            GoalKind::PreClean => "pre-clean",
            GoalKind::Clean => "clean",
            GoalKind::Bower => "bower",
            GoalKind::Lint => "lint",
            GoalKind::Prepare => "prepare",
            GoalKind::Build => "build",
            GoalKind::Package => "package",
            GoalKind::Test => "test",
            GoalKind::TestE2e => "test-e2e",
            GoalKind::Verify => "verify",
            GoalKind::Start => "start",
            GoalKind::Publish => "publish",
            GoalKind::Custom(name) => name,
        }
    }

    pub fn capabilities(&self) -> GoalCapabilities {
        use LockStrategy::{Read, Write};

        let (script, lock, includes, excludes, network, incremental) = match self {
            GoalKind::Install => ("install", Some(Write), assets::install_assets(), vec![], true, true),
            GoalKind::PreClean => ("install", Some(Write), assets::install_assets(), vec![], true, true),
            GoalKind::Clean => ("clean", Some(Write), vec![], vec![], false, false),
            GoalKind::Bower => ("bower", Some(Write), assets::bower_assets(), vec![], true, true),
            GoalKind::Lint => ("lint", Some(Read), assets::lint_assets(), vec![], false, true),
            GoalKind::Prepare => (
                "prepare",
                Some(Read),
                assets::build_assets(),
                assets::build_ignore_assets(),
                false,
                true,
            ),
            GoalKind::Build => (
                "build",
                Some(Read),
                assets::build_assets(),
                assets::build_ignore_assets(),
                false,
                true,
            ),
            GoalKind::Package => ("package", Some(Read), vec![], vec![], false, false),
            GoalKind::Test => ("test", Some(Read), assets::test_assets(), vec![], false, true),
            GoalKind::TestE2e => ("test-e2e", Some(Read), assets::test_assets(), vec![], false, true),
            GoalKind::Verify => ("verify", Some(Read), vec![], vec![], false, false),
            // Long-lived dev servers must not pin the workspace lock.
            GoalKind::Start => ("start", None, vec![], vec![], false, false),
            GoalKind::Publish => ("publish", Some(Read), vec![], vec![], true, false),
            GoalKind::Custom(name) => (name.as_str(), None, vec![], vec![], false, true),
        };

        GoalCapabilities {
            name: self.name().to_string(),
            default_script: script.to_string(),
            default_lock: lock,
            default_includes: includes,
            default_excludes: excludes,
            requires_network: network,
            incremental,
            test_class: matches!(self, GoalKind::Test | GoalKind::TestE2e),
        }
    }
}

impl FromStr for GoalKind {
    type Err = ScriptgateError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if name.is_empty() {
            return Err(ScriptgateError::ConfigError(
                "goal name must not be empty".to_string(),
            ));
        }
        let kind = match name.to_lowercase().as_str() {
            "install" => GoalKind::Install,
            "pre-clean" | "preclean" => GoalKind::PreClean,
            "clean" => GoalKind::Clean,
            "bower" => GoalKind::Bower,
            "lint" => GoalKind::Lint,
            "prepare" => GoalKind::Prepare,
            "build" => GoalKind::Build,
            "package" => GoalKind::Package,
            "test" => GoalKind::Test,
            "test-e2e" | "e2e" => GoalKind::TestE2e,
            "verify" => GoalKind::Verify,
            "start" => GoalKind::Start,
            "publish" => GoalKind::Publish,
            _ => GoalKind::Custom(name.to_string()),
        };
        Ok(kind)
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A script name plus the extra arguments configured after it.
///
/// `"build --prod"` becomes `script = "build"`, `extras = ["--prod"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInvocation {
    pub script: String,
    pub extras: Vec<String>,
}

impl ScriptInvocation {
    pub fn parse(value: &str) -> Result<Self> {
        let mut parts = value.split_whitespace();
        let script = parts
            .next()
            .ok_or_else(|| ScriptgateError::ConfigError("script must not be empty".to_string()))?;
        Ok(Self {
            script: script.to_string(),
            extras: parts.map(str::to_string).collect(),
        })
    }
}

/// Normalized form (single spaces), used as the dedup key.
impl fmt::Display for ScriptInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.script)?;
        for extra in &self.extras {
            write!(f, " {extra}")?;
        }
        Ok(())
    }
}
