// src/exec/command.rs

//! Command model handed to a [`ProcessRunner`](super::ProcessRunner).

use std::fmt;

/// A single argument, optionally with a different form for display.
///
/// Proxy URIs carry credentials: the process receives `value`, logs only
/// ever see `display`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CommandArg {
    value: String,
    display: Option<String>,
}

impl CommandArg {
    fn shown(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.value)
    }
}

/// Launcher placed in front of the real command on platforms that cannot
/// invoke the executable directly (e.g. `cmd /C npm ...` on Windows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indirection {
    pub launcher: String,
    pub launcher_args: Vec<String>,
}

impl Indirection {
    /// `cmd /C`, used on Windows where `npm` is a batch script.
    pub fn windows_shell() -> Self {
        Self {
            launcher: "cmd".to_string(),
            launcher_args: vec!["/C".to_string()],
        }
    }
}

/// Executable plus an insertion-ordered set of arguments.
///
/// Adding an argument that is already present is a no-op, so the argument
/// list never contains duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandModel {
    executable: String,
    args: Vec<CommandArg>,
    indirection: Option<Indirection>,
}

impl CommandModel {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            indirection: None,
        }
    }

    /// Wrap with the launcher the current platform needs, if any.
    pub fn for_platform(self) -> Self {
        if cfg!(windows) {
            self.with_indirection(Indirection::windows_shell())
        } else {
            self
        }
    }

    pub fn with_indirection(mut self, indirection: Indirection) -> Self {
        self.indirection = Some(indirection);
        self
    }

    pub fn indirection(&self) -> Option<&Indirection> {
        self.indirection.as_ref()
    }

    pub fn add_argument(&mut self, value: impl Into<String>) {
        self.push(CommandArg {
            value: value.into(),
            display: None,
        });
    }

    /// Add an argument whose real value must not appear in logs.
    pub fn add_secret_argument(&mut self, value: impl Into<String>, display: impl Into<String>) {
        self.push(CommandArg {
            value: value.into(),
            display: Some(display.into()),
        });
    }

    fn push(&mut self, arg: CommandArg) {
        if !self.args.iter().any(|a| a.value == arg.value) {
            self.args.push(arg);
        }
    }

    pub fn has_argument(&self, value: &str) -> bool {
        self.args.iter().any(|a| a.value == value)
    }

    /// Name of the wrapped executable (never the launcher).
    pub fn name(&self) -> &str {
        &self.executable
    }

    /// Raw argument values, deduplicated, in insertion order.
    pub fn arguments(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.value.as_str()).collect()
    }

    /// `"executable arg1 arg2 ..."` with secrets masked. Indirection is not
    /// shown.
    pub fn render(&self) -> String {
        let mut out = self.executable.clone();
        for arg in &self.args {
            out.push(' ');
            out.push_str(arg.shown());
        }
        out
    }

    /// Program actually spawned.
    pub fn program(&self) -> &str {
        match &self.indirection {
            Some(ind) => &ind.launcher,
            None => &self.executable,
        }
    }

    /// Arguments actually passed to [`program`](Self::program).
    pub fn process_arguments(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len() + 3);
        if let Some(ind) = &self.indirection {
            out.extend(ind.launcher_args.iter().cloned());
            out.push(self.executable.clone());
        }
        out.extend(self.args.iter().map(|a| a.value.clone()));
        out
    }
}

impl fmt::Display for CommandModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
