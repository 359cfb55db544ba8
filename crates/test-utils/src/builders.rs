#![allow(dead_code)]

use std::path::Path;

use scriptgate::config::{ConfigFile, IncrementalGoalSection, RawConfigFile};
use scriptgate::fs::mock::MockFileSystem;
use scriptgate::proxy::ProxySettings;
use scriptgate::types::{ClientSetting, LockStrategy};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the defaults with the client pinned to npm and the trigger
/// flag off, so expected command lines stay short.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.build.client = ClientSetting::Npm;
        config.build.trigger_flag = false;
        Self { config }
    }

    pub fn client(mut self, client: ClientSetting) -> Self {
        self.config.build.client = client;
        self
    }

    pub fn color(mut self, val: bool) -> Self {
        self.config.build.color = val;
        self
    }

    pub fn trigger_flag(mut self, val: bool) -> Self {
        self.config.build.trigger_flag = val;
        self
    }

    pub fn fail_on_error(mut self, val: bool) -> Self {
        self.config.build.fail_on_error = val;
        self
    }

    pub fn fail_on_missing_script(mut self, val: bool) -> Self {
        self.config.build.fail_on_missing_script = val;
        self
    }

    pub fn skip_tests(mut self, val: bool) -> Self {
        self.config.build.skip_tests = val;
        self
    }

    pub fn offline(mut self, val: bool) -> Self {
        self.config.build.offline = val;
        self
    }

    pub fn persist_after_tolerated_failure(mut self, val: bool) -> Self {
        self.config.build.persist_after_tolerated_failure = val;
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.config
            .build
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxySettings) -> Self {
        self.config.build.ignore_proxies = false;
        self.config.proxy.push(proxy);
        self
    }

    pub fn output_dir(mut self, dir: &str) -> Self {
        self.config.build.output_dir = dir.to_string();
        self
    }

    pub fn incremental(mut self, val: bool) -> Self {
        self.config.incremental.enabled = val;
        self
    }

    /// Track only `patterns` for `goal` (catalog defaults disabled).
    pub fn goal_includes(mut self, goal: &str, patterns: &[&str]) -> Self {
        let entry = self
            .config
            .incremental
            .goal
            .entry(goal.to_string())
            .or_insert_with(IncrementalGoalSection::default);
        entry.use_default_includes = false;
        entry.includes = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn goal_excludes(mut self, goal: &str, patterns: &[&str]) -> Self {
        let entry = self
            .config
            .incremental
            .goal
            .entry(goal.to_string())
            .or_insert_with(IncrementalGoalSection::default);
        entry.excludes = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn goal_script(mut self, goal: &str, script: &str) -> Self {
        self.config.goal.entry(goal.to_string()).or_default().script = Some(script.to_string());
        self
    }

    pub fn goal_legacy_script(mut self, goal: &str, script: &str) -> Self {
        self.config
            .goal
            .entry(goal.to_string())
            .or_default()
            .legacy_script = Some(script.to_string());
        self
    }

    pub fn skip_goal(mut self, goal: &str) -> Self {
        self.config.goal.entry(goal.to_string()).or_default().skip = true;
        self
    }

    pub fn lock(mut self, goal: &str, strategy: LockStrategy) -> Self {
        self.config.lock.insert(goal.to_string(), strategy);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `<dir>/package.json` declaring `scripts`.
pub fn write_manifest(fs: &MockFileSystem, dir: impl AsRef<Path>, scripts: &[(&str, &str)]) {
    let scripts: Vec<String> = scripts
        .iter()
        .map(|(name, body)| format!("    \"{name}\": \"{body}\""))
        .collect();
    let json = format!(
        "{{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\",\n  \"scripts\": {{\n{}\n  }}\n}}\n",
        scripts.join(",\n")
    );
    fs.add_file(dir.as_ref().join("package.json"), json);
}
