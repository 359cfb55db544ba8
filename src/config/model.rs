// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::proxy::ProxySettings;
use crate::types::{Client, ClientSetting, LockStrategy};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [build]
/// client = "auto"
/// fail_on_error = true
///
/// [incremental]
/// enabled = true
///
/// [incremental.goal.build]
/// includes = ["src/**"]
///
/// [lock]
/// lint = "none"
///
/// [goal.build]
/// script = "build --prod"
///
/// [[proxy]]
/// host = "squid.local"
/// port = 8080
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub incremental: IncrementalSection,

    /// Explicit lock strategy per goal name.
    #[serde(default)]
    pub lock: BTreeMap<String, LockStrategy>,

    /// Per-goal settings from `[goal.<name>]`.
    #[serde(default)]
    pub goal: BTreeMap<String, GoalSection>,

    #[serde(default)]
    pub proxy: Vec<ProxySettings>,

    /// Commands each client runs without the `run` prefix, keyed by client
    /// name. Clients not listed use their built-in table.
    #[serde(default)]
    pub standard_commands: BTreeMap<String, Vec<String>>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub build: BuildSection,
    pub incremental: IncrementalSection,
    pub lock: BTreeMap<String, LockStrategy>,
    pub goal: BTreeMap<String, GoalSection>,
    pub proxy: Vec<ProxySettings>,
    pub standard_commands: BTreeMap<String, Vec<String>>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            build: raw.build,
            incremental: raw.incremental,
            lock: raw.lock,
            goal: raw.goal,
            proxy: raw.proxy,
            standard_commands: raw.standard_commands,
        }
    }

    /// Settings for `goal`, matched case-insensitively.
    pub fn goal_section(&self, goal: &str) -> Option<&GoalSection> {
        self.goal
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(goal))
            .map(|(_, section)| section)
    }

    /// True when `command` is handled natively by `client` and must not be
    /// prefixed with `run`. Client keys and commands are case-insensitive.
    pub fn is_standard_command(&self, client: Client, command: &str) -> bool {
        let table = self
            .standard_commands
            .iter()
            .find(|(name, _)| name.parse::<Client>().is_ok_and(|c| c == client))
            .map(|(_, list)| list);
        match table {
            Some(list) => list.iter().any(|c| c.eq_ignore_ascii_case(command)),
            None => client
                .default_standard_commands()
                .iter()
                .any(|c| c.eq_ignore_ascii_case(command)),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[build]` section: behaviour shared by every goal.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// `"auto"`, `"npm"`, `"yarn"` or `"pnpm"`.
    #[serde(default)]
    pub client: ClientSetting,

    /// Path to the client executable; defaults to the client name on `PATH`.
    #[serde(default)]
    pub client_path: Option<String>,

    /// Build output directory, relative to each working directory. Holds
    /// the fingerprint state files and is excluded from fingerprints.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Skip every goal.
    #[serde(default)]
    pub skip: bool,

    /// Skip test-class goals (`test`, `test-e2e`).
    #[serde(default)]
    pub skip_tests: bool,

    /// Keep client colour output. When false, `--no-color` is passed.
    #[serde(default)]
    pub color: bool,

    #[serde(default = "default_true")]
    pub fail_on_error: bool,

    #[serde(default = "default_true")]
    pub fail_on_missing_script: bool,

    /// Do not forward `[[proxy]]` entries to the client.
    #[serde(default = "default_true")]
    pub ignore_proxies: bool,

    /// Append [`trigger_flag_name`](Self::trigger_flag_name) so scripts can
    /// tell they were started by this tool.
    #[serde(default = "default_true")]
    pub trigger_flag: bool,

    #[serde(default = "default_trigger_flag_name")]
    pub trigger_flag_name: String,

    /// Goals that need the network fail instead of running.
    #[serde(default)]
    pub offline: bool,

    /// Store the fingerprint snapshot even when the script failed and
    /// `fail_on_error = false` let the build continue.
    #[serde(default = "default_true")]
    pub persist_after_tolerated_failure: bool,

    /// Extra environment variables for the client process.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> String {
    "target".to_string()
}

fn default_trigger_flag_name() -> String {
    "--scriptgate".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            client: ClientSetting::default(),
            client_path: None,
            output_dir: default_output_dir(),
            skip: false,
            skip_tests: false,
            color: false,
            fail_on_error: true,
            fail_on_missing_script: true,
            ignore_proxies: true,
            trigger_flag: true,
            trigger_flag_name: default_trigger_flag_name(),
            offline: false,
            persist_after_tolerated_failure: true,
            environment: BTreeMap::new(),
        }
    }
}

/// `[incremental]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IncrementalSection {
    /// Master switch; nothing is tracked unless this is true.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub use_default_includes: bool,

    #[serde(default = "default_true")]
    pub use_default_excludes: bool,

    /// Patterns added to every tracked goal.
    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,

    /// Per-goal settings from `[incremental.goal.<name>]`.
    #[serde(default)]
    pub goal: BTreeMap<String, IncrementalGoalSection>,
}

impl Default for IncrementalSection {
    fn default() -> Self {
        Self {
            enabled: false,
            use_default_includes: true,
            use_default_excludes: true,
            includes: Vec::new(),
            excludes: Vec::new(),
            goal: BTreeMap::new(),
        }
    }
}

impl IncrementalSection {
    fn goal_section(&self, goal: &str) -> Option<&IncrementalGoalSection> {
        self.goal
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(goal))
            .map(|(_, section)| section)
    }

    /// Tracking is on when the master switch is on and the goal did not
    /// opt out.
    pub fn is_enabled(&self, goal: &str) -> bool {
        self.enabled && self.goal_section(goal).is_none_or(|g| g.enabled)
    }

    pub fn includes(&self, goal: &str) -> &[String] {
        self.goal_section(goal).map(|g| g.includes.as_slice()).unwrap_or(&[])
    }

    pub fn excludes(&self, goal: &str) -> &[String] {
        self.goal_section(goal).map(|g| g.excludes.as_slice()).unwrap_or(&[])
    }

    pub fn use_default_includes(&self, goal: &str) -> bool {
        self.use_default_includes
            && self.goal_section(goal).is_none_or(|g| g.use_default_includes)
    }

    pub fn use_default_excludes(&self, goal: &str) -> bool {
        self.use_default_excludes
            && self.goal_section(goal).is_none_or(|g| g.use_default_excludes)
    }
}

/// `[incremental.goal.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IncrementalGoalSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,

    #[serde(default = "default_true")]
    pub use_default_includes: bool,

    #[serde(default = "default_true")]
    pub use_default_excludes: bool,
}

impl Default for IncrementalGoalSection {
    fn default() -> Self {
        Self {
            enabled: true,
            includes: Vec::new(),
            excludes: Vec::new(),
            use_default_includes: true,
            use_default_excludes: true,
        }
    }
}

/// `[goal.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GoalSection {
    /// Script to run instead of the goal's default, optionally followed by
    /// extra arguments (`"build --prod"`).
    #[serde(default)]
    pub script: Option<String>,

    /// Deprecated spelling of `script`. Takes precedence when both are set.
    #[serde(default)]
    pub legacy_script: Option<String>,

    #[serde(default)]
    pub skip: bool,
}
