mod common;
use crate::common::builders::{write_manifest, ConfigFileBuilder};
use crate::common::{with_timeout, FakeRunner, TestResult};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use scriptgate::engine::{GoalKind, Orchestrator};
use scriptgate::fs::mock::MockFileSystem;
use scriptgate::run_modules;
use scriptgate_test_utils::RunEvent;

/// `/workspace/a` only declares `bundle`; `/workspace/b` declares both.
fn two_modules() -> (MockFileSystem, PathBuf, PathBuf) {
    let fs = MockFileSystem::new();
    let a = PathBuf::from("/workspace/a");
    let b = PathBuf::from("/workspace/b");
    write_manifest(&fs, &a, &[("bundle", "rollup")]);
    write_manifest(&fs, &b, &[("compile", "tsc"), ("bundle", "rollup")]);
    (fs, a, b)
}

fn goals(names: &[&str]) -> Vec<GoalKind> {
    names.iter().map(|n| n.parse().unwrap()).collect()
}

fn position(timeline: &[RunEvent], finished: bool, dir: &Path, script: &str) -> Option<usize> {
    timeline.iter().position(|event| match event {
        RunEvent::Started { working_dir, rendered } if !finished => {
            working_dir == dir && rendered.contains(script)
        }
        RunEvent::Finished { working_dir, rendered } if finished => {
            working_dir == dir && rendered.contains(script)
        }
        _ => false,
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn next_goal_waits_for_every_module() -> TestResult {
    let (fs, a, b) = two_modules();
    let runner = FakeRunner::new();
    runner.delay_script("compile", Duration::from_millis(150));
    let config = ConfigFileBuilder::new().fail_on_missing_script(false).build();
    let orch = Orchestrator::new(config, Arc::new(fs), Arc::new(runner.clone()));

    with_timeout(run_modules(orch, goals(&["compile", "bundle"]), vec![a.clone(), b.clone()]))
        .await?;

    let timeline = runner.timeline();
    let compile_done = position(&timeline, true, &b, "compile").expect("b compiled");
    let a_bundle = position(&timeline, false, &a, "bundle").expect("a bundled");
    let b_bundle = position(&timeline, false, &b, "bundle").expect("b bundled");
    assert!(compile_done < a_bundle, "timeline: {timeline:?}");
    assert!(compile_done < b_bundle, "timeline: {timeline:?}");
    Ok(())
}

#[tokio::test]
async fn failed_module_sits_out_later_goals() -> TestResult {
    let (fs, a, b) = two_modules();
    let runner = FakeRunner::new();
    runner.respond("compile", 2, &["error TS2304"]);
    let config = ConfigFileBuilder::new().fail_on_missing_script(false).build();
    let orch = Orchestrator::new(config, Arc::new(fs), Arc::new(runner.clone()));

    let result = with_timeout(run_modules(
        orch,
        goals(&["compile", "bundle"]),
        vec![a.clone(), b.clone()],
    ))
    .await;

    let err = result.expect_err("module b failed");
    assert!(err.to_string().contains("1 module(s) failed"));
    let bundled: Vec<PathBuf> = runner
        .invocations()
        .into_iter()
        .filter(|i| i.arguments.iter().any(|arg| arg == "bundle"))
        .map(|i| i.working_dir)
        .collect();
    assert_eq!(bundled, vec![a]);
    Ok(())
}
