//! Backward data dependencies.
//!
//! For each operand variable of an instruction, the nearest earlier
//! instruction in the same run that touches the same variable is recorded as
//! a [`DataDependency`]. Runs are the top level and each gate body; a body
//! never sees the instructions around its definition and vice versa.

use tracing::trace;

use qdbg_ir::{DataDependency, Instruction, variable_base_name};

/// Fill in `data_dependencies` for every instruction.
///
/// Instructions must be contiguous and ordered by id, as produced by the
/// pipeline.
pub fn link_dependencies(instructions: &mut [Instruction]) {
    let Some(first) = instructions.first().map(|i| i.index) else {
        return;
    };
    let runs = assign_runs(instructions, first);

    for position in 0..instructions.len() {
        if !consumes(&instructions[position]) {
            continue;
        }
        let run = runs[position];
        let start = run.map_or(0, |header| header - first + 1);

        let mut wanted: Vec<&str> = instructions[position].variables().collect();
        let mut dependencies = Vec::new();

        for earlier in (start..position).rev() {
            if wanted.is_empty() {
                break;
            }
            let producer = &instructions[earlier];
            if runs[earlier] != run || !produces(producer) {
                continue;
            }
            for (operand, target) in producer.targets.iter().enumerate() {
                let variable = variable_base_name(target);
                if let Some(w) = wanted.iter().position(|v| *v == variable) {
                    wanted.remove(w);
                    dependencies.push(DataDependency::new(producer.index, operand));
                }
            }
        }

        if !dependencies.is_empty() {
            trace!(
                instruction = instructions[position].index,
                count = dependencies.len(),
                "linked dependencies"
            );
        }
        instructions[position].data_dependencies = dependencies;
    }
}

/// Header id of the innermost gate body each instruction belongs to, or
/// `None` at the top level.
fn assign_runs(instructions: &[Instruction], first: usize) -> Vec<Option<usize>> {
    let mut runs = vec![None; instructions.len()];
    // Outer headers come first, so inner bodies overwrite them.
    for header in instructions.iter().filter(|i| i.is_function_definition) {
        for &child in &header.child_instructions {
            if let Some(run) = child.checked_sub(first).and_then(|p| runs.get_mut(p)) {
                *run = Some(header.index);
            }
        }
    }
    runs
}

fn consumes(instruction: &Instruction) -> bool {
    !instruction.is_function_definition && !instruction.is_return()
}

fn produces(instruction: &Instruction) -> bool {
    consumes(instruction) && !instruction.is_assertion()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;

    fn deps(code: &str, index: usize) -> Vec<(usize, usize)> {
        let program = preprocess(code).unwrap();
        program.instructions[index]
            .data_dependencies
            .iter()
            .map(|d| (d.instruction, d.operand))
            .collect()
    }

    #[test]
    fn test_nearest_producer() {
        assert_eq!(deps("qreg q[1]; x q[0]; y q[0];", 2), vec![(1, 0)]);
    }

    #[test]
    fn test_declaration_is_producer() {
        assert_eq!(deps("qreg q[2]; h q[0];", 1), vec![(0, 0)]);
    }

    #[test]
    fn test_two_operands_same_register() {
        // Both operands of cx name `q`, so two producers are needed.
        assert_eq!(
            deps("qreg q[2]; h q[0]; x q[1]; cx q[0], q[1];", 3),
            vec![(2, 0), (1, 0)]
        );
    }

    #[test]
    fn test_body_does_not_see_outside() {
        let code = "qreg q[1]; x q[0]; gate f a { h a; z a; } f q[0];";
        // `h a` is the first instruction of the body.
        assert!(deps(code, 3).is_empty());
        assert_eq!(deps(code, 4), vec![(3, 0)]);
        // The call skips the body and links to `x q[0]`.
        assert_eq!(deps(code, 6), vec![(1, 0)]);
    }

    #[test]
    fn test_headers_and_returns_have_none() {
        let program = preprocess("qreg q[1]; gate f a { x a; } f q[0];").unwrap();
        assert!(program.instructions[1].data_dependencies.is_empty());
        assert!(program.instructions[3].data_dependencies.is_empty());
    }
}
