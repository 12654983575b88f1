//! Error types for the preprocessor.

use std::fmt;

use qdbg_ir::AssertionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a parsing error occurred, in terms of the original source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    /// Label used as the file part of the message, `<input>` by default.
    pub source_name: String,
    /// One-based line.
    pub line: usize,
    /// One-based column.
    pub column: usize,
    /// Undecorated description of the problem.
    pub detail: String,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.source_name, self.line, self.column, self.detail
        )
    }
}

/// Errors that abort preprocessing.
///
/// Every variant is located. The `Display` form is
/// `<input>:LINE:COLUMN: DETAIL`, which is what calling tooling shows.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParsingError {
    /// A gate definition is not followed by a `{ ... }` body.
    #[error("{location}")]
    MissingBodyBlock {
        gate: String,
        location: ErrorLocation,
    },

    /// A `qreg`/`creg` declaration without a name or a numeric size.
    #[error("{location}")]
    InvalidRegisterDeclaration {
        declaration: String,
        location: ErrorLocation,
    },

    /// An operand list contains an empty entry (`x q[0],;`).
    #[error("{location}")]
    EmptyTarget { location: ErrorLocation },

    /// Malformed index syntax, or an undeclared or too small register.
    #[error("{location}")]
    InvalidTargetQubit {
        target: String,
        location: ErrorLocation,
    },

    /// A gate call passes the wrong number of arguments.
    #[error("{location}")]
    ArityMismatch {
        gate: String,
        expected: usize,
        got: usize,
        location: ErrorLocation,
    },

    /// The assertion collaborator rejected an assertion.
    #[error("{location}")]
    InvalidAssertion {
        source: AssertionError,
        location: ErrorLocation,
    },
}

impl ParsingError {
    /// The structured location of the error.
    pub fn location(&self) -> &ErrorLocation {
        match self {
            Self::MissingBodyBlock { location, .. }
            | Self::InvalidRegisterDeclaration { location, .. }
            | Self::EmptyTarget { location }
            | Self::InvalidTargetQubit { location, .. }
            | Self::ArityMismatch { location, .. }
            | Self::InvalidAssertion { location, .. } => location,
        }
    }

    /// One-based line.
    pub fn line(&self) -> usize {
        self.location().line
    }

    /// One-based column.
    pub fn column(&self) -> usize {
        self.location().column
    }

    /// The message without the `<input>:LINE:COLUMN: ` prefix.
    pub fn detail(&self) -> &str {
        &self.location().detail
    }
}

/// Result type for preprocessing operations.
pub type ParseResult<T> = Result<T, ParsingError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn location(detail: &str) -> ErrorLocation {
        ErrorLocation {
            source_name: "<input>".into(),
            line: 3,
            column: 7,
            detail: detail.into(),
        }
    }

    #[test]
    fn test_display_format() {
        let err = ParsingError::InvalidTargetQubit {
            target: "q[5]".into(),
            location: location("Invalid target qubit q[5]."),
        };
        assert_eq!(err.to_string(), "<input>:3:7: Invalid target qubit q[5].");
        assert_eq!(err.line(), 3);
        assert_eq!(err.column(), 7);
        assert_eq!(err.detail(), "Invalid target qubit q[5].");
    }

    #[test]
    fn test_assertion_source_is_kept() {
        let err = ParsingError::InvalidAssertion {
            source: AssertionError::Invalid("bad similarity".into()),
            location: location("bad similarity"),
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("bad similarity"));
    }
}
