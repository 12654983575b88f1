//! The boundary to the assertion grammar.
//!
//! Assertions (`assert-ent q[0], q[1];`, `assert-sup q;`, ...) are parsed by an
//! external collaborator. The preprocessor asks it whether an instruction is
//! an assertion, hands over the text and any trailing block, and then works
//! with the returned [`Assertion`] through its target accessors.

use qdbg_ir::{Assertion, AssertionError, AssertionResult};

/// Recognises and parses assertion pseudo-instructions.
pub trait AssertionParser: Send + Sync {
    /// Check whether `code` is an assertion.
    fn is_assertion(&self, code: &str) -> bool;

    /// Parse an assertion. `block` is the raw text of a trailing `{ ... }`
    /// body, if the instruction had one.
    fn parse(&self, code: &str, block: Option<&str>) -> AssertionResult<Box<dyn Assertion>>;
}

/// A parser that recognises no assertions at all.
///
/// Programs preprocessed with it treat `assert-*` lines as ordinary gates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAssertions;

impl AssertionParser for NoAssertions {
    fn is_assertion(&self, _code: &str) -> bool {
        false
    }

    fn parse(&self, code: &str, _block: Option<&str>) -> AssertionResult<Box<dyn Assertion>> {
        Err(AssertionError::Syntax(format!(
            "Assertions are not supported: {}",
            code.trim()
        )))
    }
}
