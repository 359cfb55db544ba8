// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fingerprint;
pub mod fs;
pub mod lock;
pub mod logging;
pub mod manifest;
pub mod proxy;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, Command};
use crate::config::loader::{default_config_path, load_and_validate, load_or_default};
use crate::config::model::ConfigFile;
use crate::engine::{GoalKind, Orchestrator};
use crate::exec::TokioProcessRunner;
use crate::fs::RealFileSystem;
use crate::lock::WorkspaceLock;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the orchestrator (real filesystem, tokio process runner, global lock)
/// - one task per module directory for `run`
pub async fn run(args: CliArgs) -> Result<()> {
    let config = load_config(Path::new(&args.config))?;

    let orchestrator = Orchestrator::new(
        config,
        Arc::new(RealFileSystem),
        Arc::new(TokioProcessRunner::new()),
    )
    .with_lock(WorkspaceLock::global());

    match args.command {
        Command::Run {
            goals,
            modules,
            dry_run,
        } => {
            let goals = goals
                .iter()
                .map(|g| g.parse::<GoalKind>())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let modules = if modules.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                modules
            };

            if dry_run {
                print_dry_run(&orchestrator, &goals, &modules)?;
                return Ok(());
            }
            run_modules(orchestrator, goals, modules).await
        }
        Command::Check { module } => {
            let dir = module.unwrap_or_else(|| PathBuf::from("."));
            orchestrator.check_tools(&dir).await?;
            Ok(())
        }
        Command::Dependencies { module } => {
            let dir = module.unwrap_or_else(|| PathBuf::from("."));
            orchestrator.dependencies(&dir)?;
            Ok(())
        }
    }
}

/// The default path may be absent; an explicit one must exist.
fn load_config(path: &Path) -> Result<ConfigFile> {
    let config = if path == default_config_path() {
        load_or_default(path)?
    } else {
        load_and_validate(path).with_context(|| format!("loading config {:?}", path))?
    };
    debug!(config = ?path, "configuration loaded");
    Ok(config)
}

/// Run `goals` in order across `modules`.
///
/// Each goal runs in every module concurrently, and the next goal starts
/// only once all modules are done with the current one. A module whose goal
/// fails takes no part in later goals. Modules share the orchestrator, so
/// they share its lock and execution markers.
pub async fn run_modules(
    orchestrator: Orchestrator,
    goals: Vec<GoalKind>,
    modules: Vec<PathBuf>,
) -> Result<()> {
    let mut active = modules;
    let mut failed = Vec::new();

    for goal in goals {
        let mut tasks = JoinSet::new();
        for dir in active.drain(..) {
            let orchestrator = orchestrator.clone();
            let goal = goal.clone();
            tasks.spawn(async move {
                let result = orchestrator.execute(&goal, &dir).await;
                (dir, result)
            });
        }

        let mut executed = 0usize;
        let mut skipped = 0usize;
        while let Some(joined) = tasks.join_next().await {
            let (dir, result) = joined.context("module task panicked")?;
            match result {
                Ok(outcome) if outcome.is_skipped() => {
                    skipped += 1;
                    active.push(dir);
                }
                Ok(_) => {
                    executed += 1;
                    active.push(dir);
                }
                Err(e) => {
                    error!(module = ?dir, goal = %goal, "module failed: {}", e);
                    failed.push(dir);
                }
            }
        }
        info!(goal = %goal, executed, skipped, failed = failed.len(), "goal finished");

        if active.is_empty() {
            break;
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("{} module(s) failed: {:?}", failed.len(), failed);
    }
    Ok(())
}

/// Simple dry-run output: print each goal's resolved command.
fn print_dry_run(
    orchestrator: &Orchestrator,
    goals: &[GoalKind],
    modules: &[PathBuf],
) -> Result<()> {
    println!("scriptgate dry-run");
    for dir in modules {
        println!();
        println!("module {}:", dir.display());
        for goal in goals {
            let prepared = orchestrator.prepare(goal, dir)?;
            println!("  - {goal}");
            println!("      cmd: {}", prepared.command);
            println!("      lock: {}", prepared.strategy);
            if prepared.tracked {
                println!("      state: {}", prepared.state.state_file.display());
            }
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
