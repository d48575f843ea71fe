use std::io;

use thiserror::Error;

/// Why a processing round produced no artifacts.
///
/// Every diagnostic variant carries the rendered source location of the
/// offending declaration (`file:line`, or `Unknown location`).
#[derive(Debug, Error)]
pub enum ProcessError {
    /// An annotation sits on a symbol it cannot apply to.
    #[error("{location}: {message}")]
    Configuration { location: String, message: String },

    /// A requested mock or fake target has the wrong kind.
    #[error("{location}: {message}")]
    InvalidTarget { location: String, message: String },

    /// A declaration reached synthesis with a kind no rule covers.
    #[error("{location}: {message}")]
    UnsupportedKind { location: String, message: String },

    #[error("{}", render_aborted(.0))]
    Aborted(Vec<ProcessError>),

    #[error("failed to write generated artifact {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

fn render_aborted(errors: &[ProcessError]) -> String {
    let mut out = format!("processing aborted with {} error(s)", errors.len());
    for error in errors {
        out.push_str("\n  ");
        out.push_str(&error.to_string());
    }
    out
}

impl ProcessError {
    pub(crate) fn configuration(location: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessError::Configuration {
            location: location.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_target(location: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessError::InvalidTarget {
            location: location.into(),
            message: message.into(),
        }
    }

    pub(crate) fn unsupported_kind(location: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessError::UnsupportedKind {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Collapse a list of errors: a single error is returned as is.
    pub(crate) fn from_many(mut errors: Vec<ProcessError>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            ProcessError::Aborted(errors)
        }
    }

    /// Stable name of the error class, used in machine-readable reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::Configuration { .. } => "configuration",
            ProcessError::InvalidTarget { .. } => "invalid_target",
            ProcessError::UnsupportedKind { .. } => "unsupported_kind",
            ProcessError::Aborted(_) => "aborted",
            ProcessError::Write { .. } => "write",
        }
    }

    /// Whether this failure comes from the analysed sources rather than the environment.
    pub fn is_diagnostic(&self) -> bool {
        match self {
            ProcessError::Aborted(errors) => errors.iter().all(ProcessError::is_diagnostic),
            ProcessError::Write { .. } => false,
            _ => true,
        }
    }

    /// The individual diagnostics, with aggregated rounds flattened.
    pub fn diagnostics(&self) -> Vec<&ProcessError> {
        match self {
            ProcessError::Aborted(errors) => {
                errors.iter().flat_map(ProcessError::diagnostics).collect()
            }
            other => vec![other],
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            ProcessError::Configuration { location, .. }
            | ProcessError::InvalidTarget { location, .. }
            | ProcessError::UnsupportedKind { location, .. } => Some(location),
            ProcessError::Aborted(_) | ProcessError::Write { .. } => None,
        }
    }

    /// The diagnostic text without its location.
    pub fn message(&self) -> Option<&str> {
        match self {
            ProcessError::Configuration { message, .. }
            | ProcessError::InvalidTarget { message, .. }
            | ProcessError::UnsupportedKind { message, .. } => Some(message),
            ProcessError::Aborted(_) | ProcessError::Write { .. } => None,
        }
    }
}
