// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptgateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cannot find package.json file in directory: {0:?}")]
    ManifestNotFound(PathBuf),

    /// The client executable could not be launched at all.
    #[error("{tool} is not available, please install it on your operating system")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The process launched but exited with a non-zero status.
    #[error("Error during: {command} (exit status {status})")]
    CommandFailed { command: String, status: i32 },

    #[error("{0}")]
    MissingScript(String),

    /// Reading, writing or deleting the persisted fingerprint file failed.
    #[error("State file error at {path:?}: {source}")]
    StateFile {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScriptgateError {
    /// Errors raised before any process is launched because the project or
    /// the configuration cannot satisfy the goal.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ScriptgateError::ConfigError(_)
                | ScriptgateError::ManifestNotFound(_)
                | ScriptgateError::MissingScript(_)
        )
    }

    pub(crate) fn state_file(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        ScriptgateError::StateFile {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ScriptgateError>;
