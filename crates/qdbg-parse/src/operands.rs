//! Operand extraction.

use qdbg_ir::{FunctionDefinition, InstructionKind, variable_base_name};

use crate::classify::{classify_syntax, closing_paren};

/// A classically controlled operation split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicControlledGate {
    /// Condition text between the outer parentheses.
    pub condition: String,
    /// The controlled operations, trimmed, without their `;`.
    pub operations: Vec<String>,
}

/// Extract the operands of an instruction of the given kind.
///
/// Measurements only report the quantum side. Classically controlled
/// instructions report the operands of every controlled operation, in order.
pub fn extract_operands(line: &str, kind: InstructionKind) -> Vec<String> {
    match kind {
        InstructionKind::FunctionDefinition => parse_function_definition(line).parameters,
        InstructionKind::Measurement => {
            let quantum = line.split("->").next().unwrap_or_default();
            extract_operands(quantum, classify_syntax(quantum))
        }
        InstructionKind::ClassicControlled => parse_classic_controlled(line)
            .operations
            .iter()
            .flat_map(|op| extract_operands(op, classify_syntax(op)))
            .collect(),
        InstructionKind::Return => vec![],
        _ => extract_plain_operands(line),
    }
}

/// Parse a `gate NAME p1, p2, ...` header.
pub fn parse_function_definition(signature: &str) -> FunctionDefinition {
    let mut tokens = signature.split_whitespace();
    let name = tokens.by_ref().find(|t| *t != "gate").unwrap_or_default();
    FunctionDefinition::new(name, split_operands(&tokens.collect::<String>()))
}

/// Split `if (condition) operations` into condition and operations.
///
/// Braces around the operations are dropped, so both `if (c) x q;` and the
/// re-inlined `if (c) { x q; y q; }` form are accepted.
pub fn parse_classic_controlled(code: &str) -> ClassicControlledGate {
    let code = code.trim();
    let code = code.strip_prefix("if").unwrap_or(code).trim_start();

    let Some(close) = closing_paren(code) else {
        return ClassicControlledGate {
            condition: code.to_string(),
            operations: vec![],
        };
    };

    let condition = code[..close]
        .strip_prefix('(')
        .unwrap_or(&code[..close])
        .trim()
        .to_string();
    let operations = code[close + 1..]
        .replace(['{', '}'], "")
        .split(';')
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .map(str::to_string)
        .collect();

    ClassicControlledGate {
        condition,
        operations,
    }
}

/// Check whether two operands name the same variable, ignoring indices.
pub fn variables_equal(a: &str, b: &str) -> bool {
    variable_base_name(a) == variable_base_name(b)
}

/// Skip the opcode and any parenthesised parameter list, then split the rest
/// on commas.
fn extract_plain_operands(line: &str) -> Vec<String> {
    let normalized = line.replace(';', " ");
    let mut tokens = normalized.split_whitespace();
    let mut balance = 0_isize;

    for token in tokens.by_ref() {
        balance += paren_delta(token);
        if balance == 0 {
            break;
        }
    }

    split_operands(&tokens.collect::<String>())
}

fn paren_delta(token: &str) -> isize {
    token.chars().fold(0, |acc, c| match c {
        '(' => acc + 1,
        ')' => acc - 1,
        _ => acc,
    })
}

/// Comma-split whitespace-free operand text. Empty text has no operands.
fn split_operands(text: &str) -> Vec<String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return vec![];
    }
    compact.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operands(line: &str) -> Vec<String> {
        extract_operands(line, classify_syntax(line))
    }

    #[test]
    fn test_plain_gate() {
        assert_eq!(operands("cx q[0], q[1];"), vec!["q[0]", "q[1]"]);
        assert_eq!(operands("\n  h\tq[0] ;"), vec!["q[0]"]);
    }

    #[test]
    fn test_parameterized_gate() {
        assert_eq!(operands("rx(0.5) q[0];"), vec!["q[0]"]);
        assert_eq!(operands("u3( pi/2, 0, pi ) q[1];"), vec!["q[1]"]);
    }

    #[test]
    fn test_no_operands() {
        assert!(operands("barrier;").is_empty());
        assert!(operands("nop;").is_empty());
    }

    #[test]
    fn test_empty_entries_are_kept() {
        assert_eq!(operands("cx q[0],,q[1];"), vec!["q[0]", "", "q[1]"]);
    }

    #[test]
    fn test_measurement_quantum_side() {
        assert_eq!(operands("measure q[0] -> c[0];"), vec!["q[0]"]);
    }

    #[test]
    fn test_declaration() {
        assert_eq!(operands("qreg q[2];"), vec!["q[2]"]);
    }

    #[test]
    fn test_function_definition() {
        let def = parse_function_definition("\ngate foo a, b\t,c ");
        assert_eq!(def.name, "foo");
        assert_eq!(def.parameters, vec!["a", "b", "c"]);

        let nullary = parse_function_definition("gate bar ");
        assert_eq!(nullary.name, "bar");
        assert!(nullary.parameters.is_empty());
    }

    #[test]
    fn test_classic_controlled() {
        let gate = parse_classic_controlled("if (c == 1) { x q[0]; cx q[0], q[1]; }");
        assert_eq!(gate.condition, "c == 1");
        assert_eq!(gate.operations, vec!["x q[0]", "cx q[0], q[1]"]);
        assert_eq!(
            operands("if (c == 1) { x q[0]; cx q[0], q[1]; }"),
            vec!["q[0]", "q[0]", "q[1]"]
        );
    }

    #[test]
    fn test_controlled_measurement() {
        assert_eq!(operands("if (c == 0) measure q[1] -> c[1];"), vec!["q[1]"]);
    }

    #[test]
    fn test_variables_equal() {
        assert!(variables_equal("q[0]", "q[1]"));
        assert!(variables_equal("q", "q[1]"));
        assert!(!variables_equal("q[0]", "r[0]"));
    }
}
