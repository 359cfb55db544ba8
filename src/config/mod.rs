// src/config/mod.rs

//! Configuration loading for scriptgate.
//!
//! - [`model`] holds the serde types for `Scriptgate.toml`.
//! - [`loader`] reads the file.
//! - [`validate`] turns a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    BuildSection, ConfigFile, GoalSection, IncrementalGoalSection, IncrementalSection,
    RawConfigFile,
};
