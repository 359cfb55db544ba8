use std::fmt;

/// Exit status and captured output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    status: i32,
    output: String,
}

impl CommandResult {
    pub fn new(status: i32, output: impl Into<String>) -> Self {
        Self {
            status,
            output: output.into(),
        }
    }

    pub fn status(&self) -> i32 {
        self.status
    }

    /// Every line the process printed, stdout and stderr interleaved in
    /// arrival order, each terminated by `\n`.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status: {}", self.status)
    }
}
