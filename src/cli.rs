// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `scriptgate`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "scriptgate",
    version,
    about = "Run package.json scripts as build goals, with locking and incremental skips.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Scriptgate.toml` in the current working directory. A missing
    /// default file means "use built-in defaults".
    #[arg(long, global = true, value_name = "PATH", default_value = "Scriptgate.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SCRIPTGATE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run goals (e.g. `install build test`) in each module directory.
    Run {
        /// Goals to run, in order.
        #[arg(required = true, value_name = "GOAL")]
        goals: Vec<String>,

        /// Module directory containing a `package.json`. Repeat for several
        /// modules; they run concurrently. Default: current directory.
        #[arg(long = "module", short = 'm', value_name = "DIR")]
        modules: Vec<PathBuf>,

        /// Resolve and print the commands, but don't execute anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that node and the package-manager client can be launched.
    Check {
        #[arg(long = "module", short = 'm', value_name = "DIR")]
        module: Option<PathBuf>,
    },

    /// List the dependencies declared in `package.json`.
    Dependencies {
        #[arg(long = "module", short = 'm', value_name = "DIR")]
        module: Option<PathBuf>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
