// src/exec/runner.rs

//! Pluggable process runner.
//!
//! The orchestrator talks to a `ProcessRunner` instead of spawning processes
//! itself. Production code uses [`TokioProcessRunner`]; tests provide a fake
//! that records invocations and returns canned results.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{Result, ScriptgateError};

use super::command::CommandModel;
use super::result::CommandResult;
use super::sink::OutputSink;

/// Future returned by [`ProcessRunner::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<CommandResult>> + Send + 'a>>;

/// Trait abstracting how a command is executed.
///
/// Contract:
/// - every output line goes to `sink` and into `CommandResult::output`, in
///   the order produced;
/// - failing to launch is an error (`ScriptgateError::ToolUnavailable`);
/// - a launched process that exits non-zero is a normal `CommandResult`.
pub trait ProcessRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        working_dir: &'a Path,
        command: &'a CommandModel,
        sink: &'a dyn OutputSink,
        env: &'a BTreeMap<String, String>,
    ) -> RunFuture<'a>;
}

/// Real runner built on `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for TokioProcessRunner {
    fn run<'a>(
        &'a self,
        working_dir: &'a Path,
        command: &'a CommandModel,
        sink: &'a dyn OutputSink,
        env: &'a BTreeMap<String, String>,
    ) -> RunFuture<'a> {
        Box::pin(async move {
            // Rendered form only: raw arguments may carry proxy credentials.
            debug!(
                program = %command.program(),
                command = %command.render(),
                dir = ?working_dir,
                "spawning process"
            );

            let mut cmd = Command::new(command.program());
            cmd.args(command.process_arguments())
                .current_dir(working_dir)
                .envs(env)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            let mut child = cmd.spawn().map_err(|source| ScriptgateError::ToolUnavailable {
                tool: capitalize(command.name()),
                source,
            })?;

            // Both pipes feed one channel so lines keep their arrival order
            // and neither pipe can fill up while the other is being read.
            let (tx, mut rx) = mpsc::unbounded_channel::<String>();
            if let Some(stdout) = child.stdout.take() {
                tokio::spawn(forward_lines(stdout, tx.clone()));
            }
            if let Some(stderr) = child.stderr.take() {
                tokio::spawn(forward_lines(stderr, tx.clone()));
            }
            drop(tx);

            let mut output = String::new();
            while let Some(line) = rx.recv().await {
                sink.line(&line);
                output.push_str(&line);
                output.push('\n');
            }

            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for process of '{}'", command.render()))?;

            // Killed by a signal: no exit code.
            let code = status.code().unwrap_or(-1);
            info!(
                command = %command.render(),
                exit_code = code,
                success = status.success(),
                "process exited"
            );

            Ok(CommandResult::new(code, output))
        })
    }
}

/// Forward every line of `reader` until EOF.
///
/// Lines are read as raw bytes and decoded lossily, so invalid UTF-8 never
/// stops the drain. A read error is logged and ends the stream.
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = decode_line(&buf);
                // Receiver gone: keep draining so the child never blocks.
                let _ = tx.send(line);
            }
            Err(e) => {
                warn!(error = %e, "stopped reading process output");
                break;
            }
        }
    }
}

/// Strip the line terminator and replace invalid UTF-8.
pub fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// `npm` -> `Npm`, used in "is not available" messages.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
