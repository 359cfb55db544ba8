// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] holds the [`CommandModel`] (executable + unique arguments,
//!   optional platform launcher).
//! - [`result`] holds the [`CommandResult`] of a finished process.
//! - [`sink`] classifies and forwards output lines.
//! - [`runner`] provides the `ProcessRunner` trait and the tokio-backed
//!   `TokioProcessRunner` used in production, which tests can replace with a
//!   fake implementation.

pub mod command;
pub mod result;
pub mod runner;
pub mod sink;

pub use command::{CommandModel, Indirection};
pub use result::CommandResult;
pub use runner::{ProcessRunner, RunFuture, TokioProcessRunner};
pub use sink::{ClassifierRule, LineClassifier, LineMatcher, OutputSink, Severity, TracingSink};
