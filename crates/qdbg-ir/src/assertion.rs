//! Assertion pseudo-instructions.
//!
//! The assertion grammar lives outside this workspace. The IR only needs to
//! own a parsed assertion and read or rewrite the qubits it targets, which is
//! all this trait exposes.

use std::fmt;

use crate::error::AssertionResult;

/// A parsed assertion owned by exactly one [`Instruction`](crate::Instruction).
pub trait Assertion: fmt::Debug + Send + Sync {
    /// The qubits this assertion refers to, in source order.
    fn target_qubits(&self) -> &[String];

    /// Replace the target list, e.g. after unfolding `q` into `q[0], q[1]`.
    fn set_target_qubits(&mut self, targets: Vec<String>);

    /// Check the assertion's own semantic constraints.
    fn validate(&self) -> AssertionResult<()>;
}
