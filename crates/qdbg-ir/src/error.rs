//! Error types for the IR crate.

use thiserror::Error;

/// Errors reported by an assertion collaborator.
///
/// The preprocessing pipeline does not interpret these; it attaches a source
/// location and surfaces the message unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AssertionError {
    /// The assertion text does not follow the assertion grammar.
    #[error("{0}")]
    Syntax(String),

    /// The assertion is well-formed but semantically invalid.
    #[error("{0}")]
    Invalid(String),
}

/// Result type for assertion operations.
pub type AssertionResult<T> = Result<T, AssertionError>;
