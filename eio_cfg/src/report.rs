//! Side-channel parse reporting.
//!
//! The parser never raises past its boundary: it returns a best-effort
//! (possibly empty) tree plus a [`ParseReport`] listing everything that
//! went wrong along the way. Issues are also logged as they are pushed.

use thiserror::Error;
use tracing::{error, warn};

/// Severity of a parse issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Suspicious but tolerable — parsing produced a usable result.
    Warning,
    /// Input was lost — the result is empty or partial.
    Error,
}

/// Everything the configuration parser can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseIssue {
    /// Search directory does not exist.
    #[error("Directory '{0}' not found")]
    DirectoryNotFound(String),

    /// No `EIO.cfg` anywhere under the search directory.
    #[error("File '{file}' not found in directory '{dir}'")]
    CfgFileNotFound { file: String, dir: String },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {message}")]
    Io { path: String, message: String },

    /// The text matched no sections at all.
    #[error("No sections found in '{path}'")]
    NoSections { path: String },

    /// First section's header does not carry the `NAME:*:MAJOR:MINOR::`
    /// root pattern — the result is an empty tree.
    #[error("Root header '{header}' does not match NAME:*:MAJOR:MINOR::")]
    RootHeaderMismatch { header: String },
}

impl ParseIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoSections { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Ordered collection of issues from one parse pass.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub issues: Vec<ParseIssue>,
}

impl ParseReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue, logging it at its severity.
    pub fn push(&mut self, issue: ParseIssue) {
        match issue.severity() {
            Severity::Warning => warn!("{issue}"),
            Severity::Error => error!("{issue}"),
        }
        self.issues.push(issue);
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity() == Severity::Error)
    }
}
