// src/manifest.rs

//! Read contract for the project manifest (`package.json`).
//!
//! Only the fields the orchestrator and the `dependencies` report need are
//! modelled; everything else in the file is ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::{Result, ScriptgateError};
use crate::fs::FileSystem;
use crate::types::{Client, ClientSetting};

pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,

    #[serde(default)]
    pub scripts: BTreeMap<String, String>,

    /// Engine constraints, e.g. `{"node": ">=18"}`.
    #[serde(default)]
    pub engines: BTreeMap<String, String>,
}

impl PackageJson {
    /// Read `<dir>/package.json`.
    ///
    /// Fails with [`ScriptgateError::ManifestNotFound`] when the file does not
    /// exist, so callers can tell "no manifest" from "broken manifest".
    pub fn read(fs: &dyn FileSystem, dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        if !fs.is_file(&path) {
            return Err(ScriptgateError::ManifestNotFound(dir.to_path_buf()));
        }

        let contents = fs.read_to_string(&path)?;
        let manifest = Self::from_json(&contents)?;
        debug!(
            manifest = ?path,
            name = ?manifest.name,
            scripts = manifest.scripts.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn has_script(&self, script: &str) -> bool {
        self.scripts.contains_key(script)
    }

    pub fn script_names(&self) -> BTreeSet<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }

    pub fn required_engine(&self, engine: &str) -> Option<&str> {
        self.engines.get(engine).map(String::as_str)
    }
}

/// Lock files that identify a client, in detection priority order.
const CLIENT_LOCK_FILES: &[(&str, Client)] = &[
    ("yarn.lock", Client::Yarn),
    ("pnpm-lock.yaml", Client::Pnpm),
];

/// Resolve the configured client for `dir`.
///
/// `auto` picks yarn or pnpm when their lock file is present and falls back
/// to npm.
pub fn detect_client(fs: &dyn FileSystem, dir: &Path, setting: ClientSetting) -> Client {
    match setting {
        ClientSetting::Npm => Client::Npm,
        ClientSetting::Yarn => Client::Yarn,
        ClientSetting::Pnpm => Client::Pnpm,
        ClientSetting::Auto => CLIENT_LOCK_FILES
            .iter()
            .find(|(file, _)| fs.is_file(&dir.join(file)))
            .map(|(_, client)| *client)
            .unwrap_or(Client::Npm),
    }
}
