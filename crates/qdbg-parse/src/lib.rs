//! QASM Preprocessor for qdbg
//!
//! This crate turns the text of an OpenQASM-2 style program, optionally
//! sprinkled with assertions, into the flat instruction list the qdbg
//! stepping engine executes. Positions reported on instructions and in error
//! messages always refer to the original, unmodified source.
//!
//! # Pipeline
//!
//! | Stage | Module | Result |
//! |-------|--------|--------|
//! | Comment removal | `sanitize` | `//` comments blanked, offsets unchanged |
//! | Block extraction | `sanitize` | `{ ... }` bodies in a side table |
//! | Splitting | `sanitize` | one statement per `;` or block |
//! | Classification | `classify` | an [`InstructionKind`](qdbg_ir::InstructionKind) per statement |
//! | Operands | `operands` | target list per instruction |
//! | Validation | `validate` | register bounds, declarations |
//! | Inlining | `inline` | gate bodies laid out after their header |
//! | Call resolution | `inline` | successors and parameter bindings |
//! | Data flow | `dependencies` | backward operand dependencies |
//!
//! # Example
//!
//! ```rust
//! use qdbg_parse::preprocess;
//!
//! let program = preprocess(
//!     r#"
//!     qreg q[2];
//!     creg c[2];
//!     gate flip a { x a; }
//!     flip q[0];
//!     measure q[0] -> c[0];
//! "#,
//! )
//! .unwrap();
//!
//! // qreg, creg, gate header, `x a`, RETURN, call, measure
//! assert_eq!(program.instructions.len(), 7);
//! let call = &program.instructions[5];
//! assert!(call.is_function_call);
//! assert_eq!(call.successor_index, 3);
//! assert_eq!(call.call_substitution["a"], "q[0]");
//! assert_eq!(program.registers["q"], 2);
//! ```
//!
//! # Errors
//!
//! The first problem found aborts preprocessing with a [`ParsingError`] whose
//! `Display` form is `<input>:LINE:COLUMN: DETAIL`:
//!
//! ```rust
//! use qdbg_parse::preprocess;
//!
//! let err = preprocess("qreg q[2]; x q[5];").unwrap_err();
//! assert_eq!(err.to_string(), "<input>:1:14: Invalid target qubit q[5].");
//! ```
//!
//! # Assertions
//!
//! Assertion syntax belongs to an external grammar, plugged in through
//! [`AssertionParser`]. Without one, [`NoAssertions`] is used and assertion
//! lines are treated as ordinary gates.

mod assertion;
mod classify;
mod dependencies;
mod error;
mod inline;
mod lexer;
mod location;
mod operands;
mod preprocess;
mod sanitize;
mod source_map;
mod validate;

pub use assertion::{AssertionParser, NoAssertions};
pub use classify::{classify, classify_syntax};
pub use dependencies::link_dependencies;
pub use error::{ErrorLocation, ParseResult, ParsingError};
pub use location::{LineColumn, locate_offset, locate_target};
pub use operands::{
    ClassicControlledGate, extract_operands, parse_classic_controlled, parse_function_definition,
    variables_equal,
};
pub use preprocess::{PreprocessOptions, PreprocessedProgram, Preprocessor, preprocess};
pub use sanitize::{
    BlockSweep, ExtractedBlock, Sanitized, Statement, remove_comments, sanitize, sweep_blocks,
};
pub use source_map::SourceMap;
pub use validate::{
    Scope, TargetViolation, check_targets, parse_register_declaration, unfold_assertion_targets,
};
