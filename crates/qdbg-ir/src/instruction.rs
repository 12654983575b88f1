//! Flattened debugger instructions.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::assertion::Assertion;

/// Successor value meaning "pop the call stack".
pub const RETURN_SUCCESSOR: usize = 0;

/// Code text of the synthetic instruction closing every gate body.
pub const RETURN_CODE: &str = "RETURN";

/// The syntactic kind of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Gate definition header (`gate foo a, b { ... }`). Never executed.
    FunctionDefinition,
    /// Qubit reset.
    Reset,
    /// Barrier (synchronization point).
    Barrier,
    /// Classically controlled operation (`if (c == 1) x q[0];`).
    ClassicControlled,
    /// Measurement (`measure q[0] -> c[0];`).
    Measurement,
    /// Register declaration (`qreg` / `creg`).
    VariableDeclaration,
    /// Assertion pseudo-instruction.
    Assertion,
    /// Any other gate application, including calls to user-defined gates.
    Gate,
    /// Synthetic end of a gate body.
    Return,
}

/// Raw body text extracted from a `{ ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Text between the braces, braces excluded.
    pub code: String,
}

impl Block {
    /// Create a block from its body text.
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// A backward data-flow edge to an earlier instruction's operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataDependency {
    /// Index of the producing instruction.
    pub instruction: usize,
    /// Position of the matching operand in the producer's targets.
    pub operand: usize,
}

impl DataDependency {
    /// Create an edge to `operand` of `instruction`.
    pub fn new(instruction: usize, operand: usize) -> Self {
        Self {
            instruction,
            operand,
        }
    }
}

/// One node of the flat debugger IR.
#[derive(Debug, Serialize, Deserialize)]
pub struct Instruction {
    /// Globally unique, contiguous id.
    pub index: usize,
    /// Instruction text with any block removed (or re-inlined for
    /// classically controlled gates).
    pub code: String,
    /// The instruction's kind.
    pub kind: InstructionKind,
    /// Parsed assertion, present only for assertions.
    #[serde(skip)]
    pub assertion: Option<Box<dyn Assertion>>,
    /// Ordered operands.
    pub targets: Vec<String>,
    /// Byte offset of the first character in the original source.
    pub source_start: usize,
    /// Byte offset of the terminating `;` or `}` in the original source.
    pub source_end: usize,
    /// Next instruction to execute; [`RETURN_SUCCESSOR`] pops the call stack.
    pub successor_index: usize,
    /// Whether this instruction calls a user-defined gate.
    pub is_function_call: bool,
    /// Name of the called gate.
    pub called_function: Option<String>,
    /// Whether this instruction lives inside a gate body.
    pub in_function_definition: bool,
    /// Whether this is a gate definition header.
    pub is_function_definition: bool,
    /// Ids of every instruction of the body (definition headers only).
    pub child_instructions: Vec<usize>,
    /// Formal parameter to actual argument, filled for resolved calls.
    pub call_substitution: BTreeMap<String, String>,
    /// Backward data-flow edges.
    pub data_dependencies: Vec<DataDependency>,
    /// Extracted block that terminated this instruction, if any.
    pub block: Option<Block>,
}

impl Instruction {
    /// Create an instruction whose successor is the next id.
    pub fn new(
        index: usize,
        code: impl Into<String>,
        kind: InstructionKind,
        targets: Vec<String>,
        span: Range<usize>,
    ) -> Self {
        Self {
            index,
            code: code.into(),
            kind,
            assertion: None,
            targets,
            source_start: span.start,
            source_end: span.end,
            successor_index: index + 1,
            is_function_call: false,
            called_function: None,
            in_function_definition: false,
            is_function_definition: kind == InstructionKind::FunctionDefinition,
            child_instructions: vec![],
            call_substitution: BTreeMap::new(),
            data_dependencies: vec![],
            block: None,
        }
    }

    /// Create the synthetic instruction that ends a gate body at `position`
    /// (the closing brace).
    pub fn function_return(index: usize, targets: Vec<String>, position: usize) -> Self {
        let mut instruction = Self::new(
            index,
            RETURN_CODE,
            InstructionKind::Return,
            targets,
            position..position,
        );
        instruction.successor_index = RETURN_SUCCESSOR;
        instruction.in_function_definition = true;
        instruction
    }

    /// Attach a parsed assertion.
    #[must_use]
    pub fn with_assertion(mut self, assertion: Box<dyn Assertion>) -> Self {
        self.assertion = Some(assertion);
        self
    }

    /// Attach an extracted block.
    #[must_use]
    pub fn with_block(mut self, block: Option<Block>) -> Self {
        self.block = block;
        self
    }

    /// Source span in the original text, end inclusive of the terminator.
    pub fn source_span(&self) -> Range<usize> {
        self.source_start..self.source_end
    }

    /// Check if this is the synthetic end of a gate body.
    pub fn is_return(&self) -> bool {
        self.kind == InstructionKind::Return
    }

    /// Check if this is an assertion.
    pub fn is_assertion(&self) -> bool {
        self.kind == InstructionKind::Assertion
    }

    /// Check if a debugger would ever execute this instruction.
    pub fn is_executable(&self) -> bool {
        !self.is_function_definition
    }

    /// Variable names referenced by the targets, index suffixes dropped.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| variable_base_name(t))
    }
}

/// The register part of an operand: `q[3]` becomes `q`, `a` stays `a`.
pub fn variable_base_name(operand: &str) -> &str {
    match operand.find('[') {
        Some(open) => &operand[..open],
        None => operand,
    }
}
