// src/logging.rs

//! Logging setup for `scriptgate` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SCRIPTGATE_LOG`: either a bare level ("debug") or full filter
//!    directives ("info,scriptgate::client=warn")
//! 3. default to `info`
//!
//! Logs go to STDERR. Lines printed by the wrapped client are emitted under
//! [`CLIENT_OUTPUT_TARGET`], so they can be filtered apart from the
//! orchestrator's own messages.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "SCRIPTGATE_LOG";

/// Target of every line forwarded from the client process.
pub const CLIENT_OUTPUT_TARGET: &str = "scriptgate::client";

const DEFAULT_DIRECTIVES: &str = "info";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let directives = filter_directives(cli_level, env_value.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .map_err(|e| anyhow!("invalid log filter '{directives}': {e}"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("logging already initialised: {e}"))?;

    tracing::debug!(filter = %directives, "logging initialised");
    Ok(())
}

/// Filter directives for the subscriber.
///
/// A CLI level always wins. An environment value that is neither a level
/// nor valid directives is ignored with a note on stderr, since logging is
/// not up yet.
pub fn filter_directives(cli_level: Option<LogLevel>, env_value: Option<&str>) -> String {
    if let Some(lvl) = cli_level {
        return level_name(level_from_log_level(lvl));
    }

    let Some(raw) = env_value.map(str::trim).filter(|v| !v.is_empty()) else {
        return DEFAULT_DIRECTIVES.to_string();
    };
    if let Some(level) = parse_level_str(raw) {
        return level_name(level);
    }
    match EnvFilter::try_new(raw) {
        Ok(_) => raw.to_string(),
        Err(e) => {
            eprintln!("ignoring {LOG_ENV_VAR}='{raw}': {e}");
            DEFAULT_DIRECTIVES.to_string()
        }
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn level_name(level: tracing::Level) -> String {
    level.to_string().to_lowercase()
}

pub fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
