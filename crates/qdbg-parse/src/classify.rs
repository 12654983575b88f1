//! Instruction classification.

use qdbg_ir::InstructionKind;

use crate::assertion::AssertionParser;

/// Classify an instruction, consulting `assertions` for assertion syntax.
///
/// Checks run in a fixed order and the first match wins: gate definition,
/// register declaration, assertion, classical control, measurement, reset,
/// barrier, and finally a plain gate.
pub fn classify(line: &str, assertions: &dyn AssertionParser) -> InstructionKind {
    match classify_syntax(line) {
        kind @ (InstructionKind::FunctionDefinition | InstructionKind::VariableDeclaration) => kind,
        _ if assertions.is_assertion(line) => InstructionKind::Assertion,
        kind => kind,
    }
}

/// Classify an instruction by its own syntax, without assertion support.
pub fn classify_syntax(line: &str) -> InstructionKind {
    if is_function_definition(line) {
        InstructionKind::FunctionDefinition
    } else if is_variable_declaration(line) {
        InstructionKind::VariableDeclaration
    } else if is_classic_controlled(line) {
        InstructionKind::ClassicControlled
    } else if is_measurement(line) {
        InstructionKind::Measurement
    } else if is_reset(line) {
        InstructionKind::Reset
    } else if is_barrier(line) {
        InstructionKind::Barrier
    } else {
        InstructionKind::Gate
    }
}

/// `gate NAME params` header.
pub fn is_function_definition(line: &str) -> bool {
    starts_with_keyword(line.trim(), "gate")
}

pub fn is_reset(line: &str) -> bool {
    starts_with_keyword(line.trim(), "reset")
}

/// `barrier q;` or a bare `barrier;`.
pub fn is_barrier(line: &str) -> bool {
    let line = line.trim();
    starts_with_keyword(line, "barrier")
        || line
            .strip_prefix("barrier")
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(';'))
}

/// `if (condition) operation`.
pub fn is_classic_controlled(line: &str) -> bool {
    line.trim()
        .strip_prefix("if")
        .map(str::trim_start)
        .is_some_and(|rest| rest.starts_with('(') && closing_paren(rest).is_some())
}

pub fn is_measurement(line: &str) -> bool {
    line.contains("->")
}

/// `qreg` or `creg` declaration.
pub fn is_variable_declaration(line: &str) -> bool {
    let line = line.trim();
    starts_with_keyword(line, "qreg") || starts_with_keyword(line, "creg")
}

/// Byte offset of the `)` that closes the first `(` in `text`.
pub(crate) fn closing_paren(text: &str) -> Option<usize> {
    let mut depth = 0_usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword)
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace)
}
