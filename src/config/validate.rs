// src/config/validate.rs

use std::collections::BTreeSet;
use std::path::{Component, Path};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, ScriptgateError};
use crate::fingerprint::path_utils::normalize_relative;
use crate::fingerprint::patterns::validate_patterns;
use crate::types::Client;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ScriptgateError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_build_section(cfg)?;
    validate_goal_scripts(cfg)?;
    validate_incremental_patterns(cfg)?;
    validate_proxies(cfg)?;
    validate_standard_commands(cfg)?;
    Ok(())
}

fn validate_build_section(cfg: &RawConfigFile) -> Result<()> {
    let output_dir = cfg.build.output_dir.trim();
    if output_dir.is_empty() {
        return Err(ScriptgateError::ConfigError(
            "[build].output_dir must not be empty".to_string(),
        ));
    }

    if normalize_relative(output_dir).is_empty() {
        return Err(ScriptgateError::ConfigError(format!(
            "[build].output_dir must name a directory below the working directory (got '{}')",
            output_dir
        )));
    }

    let path = Path::new(output_dir);
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return Err(ScriptgateError::ConfigError(format!(
            "[build].output_dir must be a relative path inside the working directory (got '{}')",
            output_dir
        )));
    }

    if cfg.build.trigger_flag && !cfg.build.trigger_flag_name.starts_with('-') {
        return Err(ScriptgateError::ConfigError(format!(
            "[build].trigger_flag_name must start with '-' (got '{}')",
            cfg.build.trigger_flag_name
        )));
    }

    if let Some(path) = &cfg.build.client_path
        && path.trim().is_empty()
    {
        return Err(ScriptgateError::ConfigError(
            "[build].client_path must not be empty when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_goal_scripts(cfg: &RawConfigFile) -> Result<()> {
    for (name, goal) in cfg.goal.iter() {
        for (key, value) in [("script", &goal.script), ("legacy_script", &goal.legacy_script)] {
            if let Some(script) = value
                && script.trim().is_empty()
            {
                return Err(ScriptgateError::ConfigError(format!(
                    "goal '{}' has an empty `{}`",
                    name, key
                )));
            }
        }
    }
    Ok(())
}

fn validate_incremental_patterns(cfg: &RawConfigFile) -> Result<()> {
    let inc = &cfg.incremental;
    validate_patterns(&inc.includes)
        .and_then(|_| validate_patterns(&inc.excludes))
        .map_err(|e| ScriptgateError::ConfigError(format!("[incremental]: {e:#}")))?;

    for (name, goal) in inc.goal.iter() {
        validate_patterns(&goal.includes)
            .and_then(|_| validate_patterns(&goal.excludes))
            .map_err(|e| {
                ScriptgateError::ConfigError(format!("[incremental.goal.{name}]: {e:#}"))
            })?;
    }
    Ok(())
}

fn validate_proxies(cfg: &RawConfigFile) -> Result<()> {
    for (idx, proxy) in cfg.proxy.iter().enumerate() {
        if proxy.host.trim().is_empty() {
            return Err(ScriptgateError::ConfigError(format!(
                "proxy #{} has an empty host",
                idx + 1
            )));
        }
        if proxy.port == 0 {
            return Err(ScriptgateError::ConfigError(format!(
                "proxy #{} ({}) must have a port >= 1",
                idx + 1,
                proxy.host
            )));
        }
    }
    Ok(())
}

fn validate_standard_commands(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in cfg.standard_commands.keys() {
        let client = name
            .parse::<Client>()
            .map_err(|e| ScriptgateError::ConfigError(format!("[standard_commands]: {e}")))?;
        if !seen.insert(client) {
            return Err(ScriptgateError::ConfigError(format!(
                "[standard_commands]: '{}' is listed more than once",
                client
            )));
        }
    }
    Ok(())
}
