//! qdbg Instruction Intermediate Representation
//!
//! This crate provides the data structures the qdbg debugger steps through.
//! A program is a single flat list of [`Instruction`]s: gate bodies are laid
//! out inline, directly after their definition header, and closed by a
//! synthetic `RETURN` instruction.
//!
//! # Core Components
//!
//! - **Instructions**: [`Instruction`] with its [`InstructionKind`], operands,
//!   original source span and control-flow links
//! - **Blocks**: [`Block`] for `{ ... }` bodies extracted during preprocessing
//! - **Data flow**: [`DataDependency`] edges to earlier operands
//! - **Gates**: [`FunctionDefinition`] for user-defined gate signatures
//! - **Assertions**: the [`Assertion`] trait implemented by the external
//!   assertion grammar
//!
//! # Control Flow
//!
//! Every instruction names its successor. A call to a user-defined gate
//! points at the first instruction of the gate body, and the body's `RETURN`
//! carries [`RETURN_SUCCESSOR`] to tell the stepping engine to pop its call
//! stack.
//!
//! ```rust
//! use qdbg_ir::{Instruction, InstructionKind, RETURN_SUCCESSOR};
//!
//! let x = Instruction::new(3, "x a;", InstructionKind::Gate, vec!["a".into()], 20..23);
//! assert_eq!(x.successor_index, 4);
//!
//! let ret = Instruction::function_return(4, vec!["a".into()], 25);
//! assert_eq!(ret.successor_index, RETURN_SUCCESSOR);
//! ```

pub mod assertion;
pub mod error;
pub mod function;
pub mod instruction;

pub use assertion::Assertion;
pub use error::{AssertionError, AssertionResult};
pub use function::FunctionDefinition;
pub use instruction::{
    Block, DataDependency, Instruction, InstructionKind, RETURN_CODE, RETURN_SUCCESSOR,
    variable_base_name,
};
