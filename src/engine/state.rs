// src/engine/state.rs

//! Per-goal execution state: where the fingerprint lives and which marker
//! the goal owns.

use std::path::{Path, PathBuf};

use crate::engine::markers::MarkerKey;
use crate::fingerprint::normalize_absolute;
use crate::fingerprint::path_utils::normalize_relative;

/// Directory under the output dir that holds fingerprint state files.
pub const STATE_DIR: &str = "scriptgate";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalState {
    pub goal: String,
    pub working_dir: PathBuf,
    pub script: String,
    pub state_file: PathBuf,
}

impl GoalState {
    pub fn new(goal: &str, working_dir: &Path, output_dir: &str, script: &str) -> Self {
        let working_dir = normalize_absolute(working_dir);
        let state_file = state_file_path(&working_dir, output_dir, script);
        Self {
            goal: goal.to_string(),
            working_dir,
            script: script.to_string(),
            state_file,
        }
    }

    pub fn marker_key(&self) -> MarkerKey {
        MarkerKey::new(self.working_dir.clone(), self.script.clone())
    }
}

/// `<working_dir>/<output_dir>/scriptgate/<url-encoded script>`.
///
/// Different scripts, or the same script with different arguments, get
/// different files.
pub fn state_file_path(working_dir: &Path, output_dir: &str, script: &str) -> PathBuf {
    working_dir
        .join(normalize_relative(output_dir))
        .join(STATE_DIR)
        .join(encode_script(script))
}

/// Form-urlencode `script` so it is a safe single file name.
pub fn encode_script(script: &str) -> String {
    form_urlencoded::byte_serialize(script.as_bytes()).collect()
}
