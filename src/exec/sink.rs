// src/exec/sink.rs

//! Routing of child-process output lines.
//!
//! The wrapped clients flag warnings and errors with textual prefixes
//! (`npm WARN`, `warning `, `ERR_PNPM_...`). [`LineClassifier`] turns those
//! conventions into a [`Severity`] using an ordered rule table; the first
//! matching rule wins. New client dialects are supported by adding rules.

use std::fmt;

use regex::Regex;
use tracing::{error, info, warn};

use crate::logging::CLIENT_OUTPUT_TARGET;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// How a rule recognises a line.
#[derive(Clone)]
pub enum LineMatcher {
    StartsWith(String),
    Contains(String),
    Pattern(Regex),
}

impl LineMatcher {
    fn is_match(&self, line: &str) -> bool {
        match self {
            LineMatcher::StartsWith(prefix) => line.starts_with(prefix.as_str()),
            LineMatcher::Contains(needle) => line.contains(needle.as_str()),
            LineMatcher::Pattern(re) => re.is_match(line),
        }
    }
}

impl fmt::Debug for LineMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineMatcher::StartsWith(s) => write!(f, "StartsWith({s:?})"),
            LineMatcher::Contains(s) => write!(f, "Contains({s:?})"),
            LineMatcher::Pattern(re) => write!(f, "Pattern({:?})", re.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierRule {
    pub matcher: LineMatcher,
    pub severity: Severity,
}

impl ClassifierRule {
    pub fn starts_with(prefix: &str, severity: Severity) -> Self {
        Self {
            matcher: LineMatcher::StartsWith(prefix.to_string()),
            severity,
        }
    }

    pub fn contains(needle: &str, severity: Severity) -> Self {
        Self {
            matcher: LineMatcher::Contains(needle.to_string()),
            severity,
        }
    }

    pub fn pattern(re: Regex, severity: Severity) -> Self {
        Self {
            matcher: LineMatcher::Pattern(re),
            severity,
        }
    }
}

/// Ordered `(matcher, severity)` table. Lines no rule matches are `Info`.
#[derive(Debug, Clone, Default)]
pub struct LineClassifier {
    rules: Vec<ClassifierRule>,
}

impl LineClassifier {
    pub fn new(rules: Vec<ClassifierRule>) -> Self {
        Self { rules }
    }

    /// Rules for npm, yarn and pnpm output.
    pub fn js_clients() -> Self {
        let mut rules = vec![
            ClassifierRule::starts_with("npm WARN ", Severity::Warn),
            ClassifierRule::starts_with("npm warn ", Severity::Warn),
            ClassifierRule::starts_with("warning ", Severity::Warn),
            ClassifierRule::starts_with("WARNING ", Severity::Warn),
            ClassifierRule::contains("DeprecationWarning: ", Severity::Warn),
            ClassifierRule::starts_with("npm ERR! ", Severity::Error),
            ClassifierRule::starts_with("npm error ", Severity::Error),
            ClassifierRule::starts_with("error ", Severity::Error),
        ];
        // pnpm indents its markers and prefixes error codes.
        if let Ok(re) = Regex::new(r"^\s*WARN\s") {
            rules.push(ClassifierRule::pattern(re, Severity::Warn));
        }
        if let Ok(re) = Regex::new(r"\bERR_PNPM_[A-Z_]+") {
            rules.push(ClassifierRule::pattern(re, Severity::Error));
        }
        Self { rules }
    }

    /// Append a rule with the lowest priority.
    pub fn with_rule(mut self, rule: ClassifierRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn classify(&self, line: &str) -> Severity {
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(line))
            .map(|rule| rule.severity)
            .unwrap_or(Severity::Info)
    }
}

/// Receives child-process output one line at a time.
pub trait OutputSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Forwards lines to `tracing` at their classified level.
#[derive(Debug, Clone)]
pub struct TracingSink {
    goal: String,
    classifier: LineClassifier,
}

impl TracingSink {
    pub fn new(goal: impl Into<String>, classifier: LineClassifier) -> Self {
        Self {
            goal: goal.into(),
            classifier,
        }
    }
}

impl OutputSink for TracingSink {
    fn line(&self, line: &str) {
        match self.classifier.classify(line) {
            Severity::Info => info!(target: CLIENT_OUTPUT_TARGET, goal = %self.goal, "{}", line),
            Severity::Warn => warn!(target: CLIENT_OUTPUT_TARGET, goal = %self.goal, "{}", line),
            Severity::Error => {
                error!(target: CLIENT_OUTPUT_TARGET, goal = %self.goal, "{}", line)
            }
        }
    }
}
