// src/engine/orchestrator.rs

//! Walks one goal from request to completion.
//!
//! For every goal the orchestrator:
//! 1. resolves the script and builds the client command;
//! 2. honors skip flags and offline mode;
//! 3. claims the execution marker (or skips as already executed);
//! 4. compares tracked inputs with the stored fingerprint;
//! 5. checks that a custom script exists in `package.json`;
//! 6. takes the workspace lock in the goal's mode;
//! 7. runs the command, then records the marker and the new fingerprint.
//!
//! Skips and configuration errors happen before the lock is requested, so
//! they never block other goals.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::model::{ConfigFile, GoalSection};
use crate::engine::goal::{GoalCapabilities, GoalKind, ScriptInvocation};
use crate::engine::markers::{Claim, ExecutionMarkers};
use crate::engine::state::GoalState;
use crate::engine::{ExecutionStage, GoalOutcome, SkipReason};
use crate::errors::{Result, ScriptgateError};
use crate::exec::{CommandModel, CommandResult, LineClassifier, ProcessRunner, TracingSink};
use crate::fingerprint::{
    assets, normalize_absolute, FileSetResolver, FingerprintSnapshot, FingerprintStore,
    PatternLayers, PatternSet,
};
use crate::fs::FileSystem;
use crate::lock::{resolve_strategy, WorkspaceLock};
use crate::manifest::{detect_client, PackageJson};
use crate::proxy::active_http_proxies;
use crate::types::{Client, LockStrategy};

/// Prefix for scripts the client does not handle natively.
pub const RUN_PREFIX: &str = "run";

/// Runtime checked by [`Orchestrator::check_tools`] next to the client.
const RUNTIME_TOOL: &str = "node";

/// A goal resolved against the configuration, ready to run.
#[derive(Debug, Clone)]
pub struct PreparedGoal {
    pub capabilities: GoalCapabilities,
    pub invocation: ScriptInvocation,
    pub client: Client,
    /// Handled natively by the client, no `run` prefix and no
    /// `package.json` lookup.
    pub standard: bool,
    /// `<client> [run] <script> <extras>`, used in log messages.
    pub base_command: CommandModel,
    /// `base_command` plus colour, trigger and proxy arguments.
    pub command: CommandModel,
    pub state: GoalState,
    pub strategy: LockStrategy,
    pub tracked: bool,
}

/// Result of a `node --version` style check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    pub tool: String,
    pub version: String,
}

#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<ConfigFile>,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn ProcessRunner>,
    lock: WorkspaceLock,
    markers: Arc<ExecutionMarkers>,
    classifier: LineClassifier,
    store: FingerprintStore,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("markers", &self.markers.len())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// New orchestrator with its own lock and markers.
    pub fn new(
        config: ConfigFile,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let store = FingerprintStore::new(Arc::clone(&fs));
        Self {
            config: Arc::new(config),
            fs,
            runner,
            lock: WorkspaceLock::new(),
            markers: Arc::new(ExecutionMarkers::new()),
            classifier: LineClassifier::js_clients(),
            store,
        }
    }

    /// Share `lock` with other orchestrators (e.g. [`WorkspaceLock::global`]).
    pub fn with_lock(mut self, lock: WorkspaceLock) -> Self {
        self.lock = lock;
        self
    }

    pub fn with_markers(mut self, markers: Arc<ExecutionMarkers>) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_classifier(mut self, classifier: LineClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn markers(&self) -> &Arc<ExecutionMarkers> {
        &self.markers
    }

    pub fn lock(&self) -> &WorkspaceLock {
        &self.lock
    }

    /// Resolve `goal` for `working_dir` without running anything.
    pub fn prepare(&self, goal: &GoalKind, working_dir: &Path) -> Result<PreparedGoal> {
        let capabilities = goal.capabilities();
        let section = self.config.goal_section(&capabilities.name);
        let invocation = ScriptInvocation::parse(&resolve_script(&capabilities, section))?;

        let working_dir = normalize_absolute(working_dir);
        let build = &self.config.build;
        let client = detect_client(self.fs.as_ref(), &working_dir, build.client);
        let standard = self.config.is_standard_command(client, &invocation.script);

        let executable = build
            .client_path
            .clone()
            .unwrap_or_else(|| client.executable().to_string());
        let mut base_command = CommandModel::new(executable).for_platform();
        if !standard {
            base_command.add_argument(RUN_PREFIX);
        }
        base_command.add_argument(invocation.script.as_str());
        for extra in &invocation.extras {
            base_command.add_argument(extra.as_str());
        }

        let mut command = base_command.clone();
        if !build.color {
            command.add_argument("--no-color");
        }
        if build.trigger_flag {
            command.add_argument(build.trigger_flag_name.as_str());
        }
        if !build.ignore_proxies {
            for proxy in active_http_proxies(&self.config.proxy) {
                command.add_argument(proxy.flag());
                command.add_secret_argument(proxy.to_uri(), proxy.to_string());
            }
        }

        let state = GoalState::new(
            &capabilities.name,
            &working_dir,
            &build.output_dir,
            &invocation.to_string(),
        );
        let strategy =
            resolve_strategy(&capabilities.name, &self.config.lock, capabilities.default_lock);
        let tracked =
            capabilities.incremental && self.config.incremental.is_enabled(&capabilities.name);

        Ok(PreparedGoal {
            capabilities,
            invocation,
            client,
            standard,
            base_command,
            command,
            state,
            strategy,
            tracked,
        })
    }

    /// Run `goal` in `working_dir`.
    ///
    /// Every error is logged before it is returned.
    pub async fn execute(&self, goal: &GoalKind, working_dir: &Path) -> Result<GoalOutcome> {
        match self.execute_inner(goal, working_dir).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.stage(goal, ExecutionStage::Failed);
                error!(goal = %goal, dir = ?working_dir, "{}", e);
                Err(e)
            }
        }
    }

    /// Run `goals` one after another in `working_dir`, stopping at the first
    /// error.
    pub async fn execute_all(
        &self,
        goals: &[GoalKind],
        working_dir: &Path,
    ) -> Result<Vec<GoalOutcome>> {
        let mut outcomes = Vec::with_capacity(goals.len());
        for goal in goals {
            outcomes.push(self.execute(goal, working_dir).await?);
        }
        Ok(outcomes)
    }

    async fn execute_inner(&self, goal: &GoalKind, working_dir: &Path) -> Result<GoalOutcome> {
        self.stage(goal, ExecutionStage::Requested);
        let prepared = self.prepare(goal, working_dir)?;
        let caps = &prepared.capabilities;
        let shown = &prepared.base_command;
        self.stage(goal, ExecutionStage::Resolved);

        if self.is_disabled(caps) {
            self.stage(goal, ExecutionStage::Skipped);
            info!(goal = %goal, "Skipping {} goal, disabled by configuration.", caps.name);
            return Ok(GoalOutcome::Skipped(SkipReason::Disabled));
        }

        if self.config.build.offline && caps.requires_network {
            return Err(ScriptgateError::ConfigError(format!(
                "goal '{}' requires online mode for execution but the build is offline",
                caps.name
            )));
        }

        let claim = match self.markers.try_claim(prepared.state.marker_key()) {
            Claim::Acquired(claim) => claim,
            Claim::AlreadyExecuted => {
                self.stage(goal, ExecutionStage::AlreadyExecuted);
                info!("Command {} already executed, skip.", shown);
                return Ok(GoalOutcome::Skipped(SkipReason::AlreadyExecuted));
            }
            Claim::InProgress => {
                self.stage(goal, ExecutionStage::AlreadyExecuted);
                info!("Command {} is being executed by another goal, skip.", shown);
                return Ok(GoalOutcome::Skipped(SkipReason::AlreadyExecuted));
            }
        };

        let snapshot = if prepared.tracked {
            self.stage(goal, ExecutionStage::CheckingFingerprint);
            let current = self.current_snapshot(caps, &prepared.state.working_dir)?;
            let previous = self.store.load_previous(&prepared.state.state_file)?;
            if !previous.is_empty() && FingerprintStore::unchanged(&previous, &current) {
                self.stage(goal, ExecutionStage::UpToDate);
                info!("Command {} already done, no changes detected, skipping.", shown);
                return Ok(GoalOutcome::Skipped(SkipReason::NoChanges));
            }
            debug!(
                goal = %goal,
                previous = previous.len(),
                current = current.len(),
                "tracked inputs changed"
            );
            Some(current)
        } else {
            None
        };

        if !prepared.standard {
            self.stage(goal, ExecutionStage::CheckingScript);
            let manifest = PackageJson::read(self.fs.as_ref(), &prepared.state.working_dir)?;
            if !manifest.has_script(&prepared.invocation.script) {
                self.stage(goal, ExecutionStage::MissingScript);
                let message = format!(
                    "Cannot execute {} command: it is not defined in package.json",
                    shown
                );
                warn!("{}", message);
                if self.config.build.fail_on_missing_script {
                    return Err(ScriptgateError::MissingScript(message));
                }
                return Ok(GoalOutcome::Skipped(SkipReason::MissingScript));
            }
        }

        self.stage(goal, ExecutionStage::AcquiringLock);
        let token = self.lock.acquire(prepared.strategy).await;

        self.stage(goal, ExecutionStage::Running);
        info!(goal = %goal, lock = %token.strategy(), "Running {}", prepared.command);
        let sink = TracingSink::new(caps.name.clone(), self.classifier.clone());
        let result = self
            .runner
            .run(
                &prepared.state.working_dir,
                &prepared.command,
                &sink,
                &self.config.build.environment,
            )
            .await?;

        if result.is_failure() {
            error!("Error during execution of: {}", prepared.command);
            error!("Exit status: {}", result.status());
            if self.config.build.fail_on_error {
                self.stage(goal, ExecutionStage::Recording);
                claim.record(false);
                drop(token);
                return Err(ScriptgateError::CommandFailed {
                    command: prepared.command.render(),
                    status: result.status(),
                });
            }
            warn!(goal = %goal, "ignoring failure, fail_on_error is disabled");
        } else {
            debug!(goal = %goal, "execution succeeded");
        }

        self.stage(goal, ExecutionStage::Recording);
        claim.record(result.is_success());

        if let Some(snapshot) = snapshot {
            if result.is_success() || self.config.build.persist_after_tolerated_failure {
                self.stage(goal, ExecutionStage::Persisting);
                self.store.persist(&prepared.state.state_file, &snapshot)?;
            } else {
                debug!(goal = %goal, "not storing fingerprint after tolerated failure");
            }
        }

        drop(token);
        self.stage(goal, ExecutionStage::Done);
        Ok(GoalOutcome::Executed(result))
    }

    fn stage(&self, goal: &GoalKind, stage: ExecutionStage) {
        debug!(goal = %goal, %stage, "goal stage");
    }

    fn is_disabled(&self, caps: &GoalCapabilities) -> bool {
        let build = &self.config.build;
        build.skip
            || (caps.test_class && build.skip_tests)
            || self
                .config
                .goal_section(&caps.name)
                .is_some_and(|section| section.skip)
    }

    fn current_snapshot(
        &self,
        caps: &GoalCapabilities,
        working_dir: &Path,
    ) -> Result<FingerprintSnapshot> {
        let inc = &self.config.incremental;
        let builtin = assets::builtin_excludes(&self.config.build.output_dir);
        let patterns = PatternSet::layered(PatternLayers {
            builtin_excludes: &builtin,
            default_includes: &caps.default_includes,
            default_excludes: &caps.default_excludes,
            global_includes: &inc.includes,
            global_excludes: &inc.excludes,
            goal_includes: inc.includes(&caps.name),
            goal_excludes: inc.excludes(&caps.name),
            use_default_includes: inc.use_default_includes(&caps.name),
            use_default_excludes: inc.use_default_excludes(&caps.name),
        });
        debug!(
            goal = %caps.name,
            includes = ?patterns.includes,
            excludes = ?patterns.excludes,
            "fingerprint patterns"
        );

        let resolver = FileSetResolver::new(&patterns)?;
        let files = resolver.resolve(self.fs.as_ref(), working_dir)?;
        Ok(self.store.compute_snapshot(&files))
    }

    /// Run `node --version` and `<client> --version` in `working_dir`.
    ///
    /// A tool that cannot be launched fails with
    /// [`ScriptgateError::ToolUnavailable`].
    pub async fn check_tools(&self, working_dir: &Path) -> Result<Vec<ToolVersion>> {
        let working_dir = normalize_absolute(working_dir);
        let client = detect_client(self.fs.as_ref(), &working_dir, self.config.build.client);
        let manifest = match PackageJson::read(self.fs.as_ref(), &working_dir) {
            Ok(manifest) => Some(manifest),
            Err(ScriptgateError::ManifestNotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let client_exe = self
            .config
            .build
            .client_path
            .clone()
            .unwrap_or_else(|| client.executable().to_string());
        let sink = TracingSink::new("check", self.classifier.clone());

        let checks = [
            (RUNTIME_TOOL, RUNTIME_TOOL.to_string()),
            (client.executable(), client_exe),
        ];
        let mut versions = Vec::new();
        for (engine, tool) in checks {
            let mut command = CommandModel::new(tool.clone()).for_platform();
            command.add_argument("--version");
            info!("Checking {} command", tool);

            let result = self
                .runner
                .run(&working_dir, &command, &sink, &self.config.build.environment)
                .await
                .inspect_err(|e| error!("{}", e))?;
            if result.is_failure() {
                return Err(self.failed(&command, &result));
            }

            let version = result.output().trim().to_string();
            match manifest.as_ref().and_then(|m| m.required_engine(engine)) {
                Some(required) => {
                    info!("{} version {} (package.json requires {})", tool, version, required)
                }
                None => info!("{} version {}", tool, version),
            }
            versions.push(ToolVersion { tool, version });
        }
        Ok(versions)
    }

    /// Log the dependencies declared in `<working_dir>/package.json`.
    pub fn dependencies(&self, working_dir: &Path) -> Result<PackageJson> {
        let working_dir = normalize_absolute(working_dir);
        let manifest =
            PackageJson::read(self.fs.as_ref(), &working_dir).inspect_err(|e| error!("{}", e))?;

        let title = manifest.name.as_deref().unwrap_or("<unnamed>");
        info!("Dependencies of {}:", title);
        for (name, version) in &manifest.dependencies {
            info!("  {}@{}", name, version);
        }
        if !manifest.dev_dependencies.is_empty() {
            info!("Development dependencies of {}:", title);
            for (name, version) in &manifest.dev_dependencies {
                info!("  {}@{}", name, version);
            }
        }
        Ok(manifest)
    }

    fn failed(&self, command: &CommandModel, result: &CommandResult) -> ScriptgateError {
        error!("Error during execution of: {}", command);
        error!("Exit status: {}", result.status());
        ScriptgateError::CommandFailed {
            command: command.render(),
            status: result.status(),
        }
    }
}

/// `legacy_script` wins over `script`, which wins over the goal default.
fn resolve_script(caps: &GoalCapabilities, section: Option<&GoalSection>) -> String {
    match section {
        Some(GoalSection {
            legacy_script: Some(legacy),
            ..
        }) => {
            warn!(
                goal = %caps.name,
                "`legacy_script` is deprecated, use `script` instead"
            );
            legacy.clone()
        }
        Some(GoalSection {
            script: Some(script),
            ..
        }) => script.clone(),
        _ => caps.default_script.clone(),
    }
}
