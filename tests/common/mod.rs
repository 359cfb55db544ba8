#![allow(dead_code)]

pub use scriptgate_test_utils::builders;
pub use scriptgate_test_utils::{init_tracing, with_timeout, FakeRunner, LogCapture};

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scriptgate::config::ConfigFile;
use scriptgate::engine::Orchestrator;
use scriptgate::fs::mock::MockFileSystem;

pub type TestResult = Result<(), Box<dyn Error>>;

/// Absolute module directory used by in-memory tests.
pub fn module_dir() -> PathBuf {
    PathBuf::from("/workspace/app")
}

/// In-memory project: `package.json` with `scripts` and a couple of
/// sources under `src/`.
pub fn mock_project(dir: &Path, scripts: &[(&str, &str)]) -> MockFileSystem {
    let fs = MockFileSystem::new();
    builders::write_manifest(&fs, dir, scripts);
    fs.add_file(dir.join("src/index.js"), "console.log('hi');\n");
    fs.add_file(dir.join("src/util.js"), "export const x = 1;\n");
    fs
}

pub fn orchestrator(config: ConfigFile, fs: &MockFileSystem, runner: &FakeRunner) -> Orchestrator {
    Orchestrator::new(config, Arc::new(fs.clone()), Arc::new(runner.clone()))
}
