use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scriptgate::errors::ScriptgateError;
use scriptgate::exec::runner::capitalize;
use scriptgate::exec::{CommandModel, CommandResult, OutputSink, ProcessRunner, RunFuture};

/// One recorded call to [`FakeRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub working_dir: PathBuf,
    pub executable: String,
    pub arguments: Vec<String>,
    /// Masked rendering, as it would appear in logs.
    pub rendered: String,
    pub env: BTreeMap<String, String>,
}

/// Start or end of a run, in the order the fake observed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Started { working_dir: PathBuf, rendered: String },
    Finished { working_dir: PathBuf, rendered: String },
}

#[derive(Debug, Clone)]
struct Response {
    status: i32,
    lines: Vec<String>,
}

/// A fake process runner that:
/// - records every invocation
/// - answers with canned status/output per script name (default: success)
/// - can pretend an executable is not installed
/// - can sleep while "running", tracking how many runs overlap
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    responses: Arc<Mutex<BTreeMap<String, Response>>>,
    unavailable: Arc<Mutex<HashSet<String>>>,
    delay: Option<Duration>,
    script_delays: Arc<Mutex<BTreeMap<String, Duration>>>,
    timeline: Arc<Mutex<Vec<RunEvent>>>,
    running: Arc<AtomicUsize>,
    max_running: Arc<AtomicUsize>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every run sleeps for `delay` before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Commands whose arguments contain `script` sleep for `delay`, on top
    /// of any delay set with [`with_delay`](Self::with_delay).
    pub fn delay_script(&self, script: &str, delay: Duration) {
        self.script_delays
            .lock()
            .unwrap()
            .insert(script.to_string(), delay);
    }

    /// Start and end events of every run.
    pub fn timeline(&self) -> Vec<RunEvent> {
        self.timeline.lock().unwrap().clone()
    }

    /// Commands whose arguments contain `script` exit with `status` after
    /// printing `lines`.
    pub fn respond(&self, script: &str, status: i32, lines: &[&str]) {
        self.responses.lock().unwrap().insert(
            script.to_string(),
            Response {
                status,
                lines: lines.iter().map(|l| l.to_string()).collect(),
            },
        );
    }

    /// Launching `executable` fails as if it were not installed.
    pub fn make_unavailable(&self, executable: &str) {
        self.unavailable.lock().unwrap().insert(executable.to_string());
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    /// Number of invocations whose arguments contain `script`.
    pub fn runs_of(&self, script: &str) -> usize {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.arguments.iter().any(|a| a == script))
            .count()
    }

    /// Highest number of runs observed in flight at the same time.
    pub fn max_concurrency(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    fn response_for(&self, command: &CommandModel) -> Response {
        let responses = self.responses.lock().unwrap();
        command
            .arguments()
            .iter()
            .find_map(|arg| responses.get(*arg).cloned())
            .unwrap_or(Response {
                status: 0,
                lines: Vec::new(),
            })
    }
}

impl ProcessRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        working_dir: &'a Path,
        command: &'a CommandModel,
        sink: &'a dyn OutputSink,
        env: &'a BTreeMap<String, String>,
    ) -> RunFuture<'a> {
        Box::pin(async move {
            if self.unavailable.lock().unwrap().contains(command.name()) {
                return Err(ScriptgateError::ToolUnavailable {
                    tool: capitalize(command.name()),
                    source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
                });
            }

            {
                let mut guard = self.invocations.lock().unwrap();
                guard.push(Invocation {
                    working_dir: working_dir.to_path_buf(),
                    executable: command.name().to_string(),
                    arguments: command.arguments().iter().map(|a| a.to_string()).collect(),
                    rendered: command.render(),
                    env: env.clone(),
                });
            }

            self.timeline.lock().unwrap().push(RunEvent::Started {
                working_dir: working_dir.to_path_buf(),
                rendered: command.render(),
            });

            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let script_delay = {
                let delays = self.script_delays.lock().unwrap();
                command
                    .arguments()
                    .iter()
                    .find_map(|arg| delays.get(*arg).copied())
            };
            if let Some(delay) = script_delay {
                tokio::time::sleep(delay).await;
            }

            let response = self.response_for(command);
            let mut output = String::new();
            for line in &response.lines {
                sink.line(line);
                output.push_str(line);
                output.push('\n');
            }

            self.running.fetch_sub(1, Ordering::SeqCst);
            self.timeline.lock().unwrap().push(RunEvent::Finished {
                working_dir: working_dir.to_path_buf(),
                rendered: command.render(),
            });
            Ok(CommandResult::new(response.status, output))
        })
    }
}

/// Sink that keeps every line it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl OutputSink for RecordingSink {
    fn line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
