//! Gate definition inlining and call resolution.
//!
//! A gate body is preprocessed recursively, right where it is defined, so
//! ids come out as: header, body, `RETURN`. Calls are resolved once the whole
//! program is known, which also covers calls to gates defined further down.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use qdbg_ir::{Block, FunctionDefinition, Instruction, InstructionKind};

use crate::classify::is_function_definition;
use crate::error::{ParseResult, ParsingError};
use crate::location::Locator;
use crate::operands::parse_function_definition;
use crate::preprocess::Pipeline;
use crate::sanitize::Statement;
use crate::validate::Scope;

/// A user-defined gate and where its inlined body lives.
#[derive(Debug, Clone)]
pub(crate) struct FunctionEntry {
    pub(crate) definition: FunctionDefinition,
    /// Id of the definition header.
    pub(crate) header: usize,
    /// Id a call jumps to: the first body instruction, or the `RETURN` of
    /// an empty body.
    pub(crate) entry: usize,
}

/// Gates defined so far, in definition order.
#[derive(Debug, Default)]
pub(crate) struct FunctionTable {
    entries: Vec<FunctionEntry>,
    by_name: FxHashMap<String, usize>,
}

impl FunctionTable {
    /// Register a gate. A second definition of the same name is ignored.
    pub(crate) fn define(&mut self, definition: FunctionDefinition, header: usize, entry: usize) {
        if let Some(&existing) = self.by_name.get(&definition.name) {
            warn!(
                "Gate '{}' redefined at instruction {}, keeping definition at {}",
                definition.name, header, self.entries[existing].header
            );
            return;
        }
        self.by_name
            .insert(definition.name.clone(), self.entries.len());
        self.entries.push(FunctionEntry {
            definition,
            header,
            entry,
        });
    }

    pub(crate) fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn into_definitions(self) -> Vec<FunctionDefinition> {
        self.entries.into_iter().map(|e| e.definition).collect()
    }
}

/// Names of every gate defined anywhere in `text`, nested bodies included.
pub(crate) fn sweep_function_names(text: &str) -> Vec<String> {
    text.split([';', '{', '}'])
        .filter(|piece| is_function_definition(piece))
        .map(|piece| parse_function_definition(piece).name)
        .filter(|name| !name.is_empty())
        .collect()
}

impl Pipeline<'_> {
    /// Emit a gate definition: header, inlined body, then `RETURN`.
    ///
    /// `base` is the original offset of the run the statement was cut from.
    pub(crate) fn inline_definition(
        &mut self,
        statement: &Statement<'_>,
        base: usize,
        scope: &mut Scope,
    ) -> ParseResult<Vec<Instruction>> {
        let signature = parse_function_definition(statement.text);
        let Some(block) = statement.block else {
            return Err(ParsingError::MissingBodyBlock {
                location: self
                    .locator
                    .at(statement.start, "Gate definitions require a body block."),
                gate: signature.name,
            });
        };

        let header_index = self.next_index;
        self.next_index += 1;

        let child = scope.enter_function(&signature.parameters);
        let body = self.run(&block.content, base + block.open_brace() + 1, child)?;
        scope.leave_function(body.scope);

        let mut instructions = body.instructions;
        for instruction in &mut instructions {
            instruction.in_function_definition = true;
        }

        let return_index = self.next_index;
        self.next_index += 1;

        let children: Vec<usize> = instructions.iter().map(|i| i.index).collect();
        let entry = children.first().copied().unwrap_or(return_index);

        let mut header = Instruction::new(
            header_index,
            statement.text,
            InstructionKind::FunctionDefinition,
            signature.parameters.clone(),
            statement.start..statement.end,
        )
        .with_block(Some(Block::new(block.content.as_str())));
        header.successor_index = return_index + 1;
        header.child_instructions = children;

        let function_return = Instruction::function_return(
            return_index,
            signature.parameters.clone(),
            base + block.close_brace(),
        );

        debug!(
            "Inlined gate '{}' ({} params) as {}..={}",
            signature.name,
            signature.arity(),
            header_index,
            return_index
        );
        self.functions.define(signature, header_index, entry);

        instructions.insert(0, header);
        instructions.push(function_return);
        Ok(instructions)
    }
}

/// Point every call at its gate's entry and bind formals to actuals.
///
/// A name that was swept but never defined (e.g. a gate declared inside a
/// classically controlled block) is demoted back to a plain gate.
pub(crate) fn resolve_calls(
    instructions: &mut [Instruction],
    functions: &FunctionTable,
    locator: &Locator<'_>,
) -> ParseResult<()> {
    let mut resolved = 0;
    for instruction in instructions.iter_mut() {
        let Some(name) = instruction.called_function.as_deref() else {
            continue;
        };
        let Some(function) = functions.get(name) else {
            warn!(
                "Instruction {} calls undefined gate '{}', treating it as a plain gate",
                instruction.index, name
            );
            instruction.is_function_call = false;
            instruction.called_function = None;
            continue;
        };

        let expected = function.definition.arity();
        let got = instruction.targets.len();
        if expected != got {
            return Err(ParsingError::ArityMismatch {
                gate: function.definition.name.clone(),
                expected,
                got,
                location: locator.at(
                    instruction.source_start,
                    "Custom gate call uses incorrect number of arguments.",
                ),
            });
        }

        instruction.successor_index = function.entry;
        instruction.call_substitution = function
            .definition
            .parameters
            .iter()
            .cloned()
            .zip(instruction.targets.iter().cloned())
            .collect();
        resolved += 1;
    }
    debug!("Resolved {} gate calls", resolved);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;

    #[test]
    fn test_sweep_function_names() {
        let names = sweep_function_names("qreg q[1]; gate f a { gate g b { x b; } g a; } f q[0];");
        assert_eq!(names, vec!["f", "g"]);
    }

    #[test]
    fn test_first_definition_wins() {
        let mut table = FunctionTable::default();
        table.define(FunctionDefinition::new("f", ["a".to_string()]), 0, 1);
        table.define(FunctionDefinition::new("f", Vec::<String>::new()), 5, 6);
        assert_eq!(table.len(), 1);
        let entry = table.get("f").unwrap();
        assert_eq!(entry.header, 0);
        assert_eq!(entry.definition.arity(), 1);
    }

    #[test]
    fn test_empty_body_enters_at_return() {
        let program = preprocess("qreg q[1]; gate nop a { } nop q[0];").unwrap();
        let header = &program.instructions[1];
        assert!(header.child_instructions.is_empty());
        assert_eq!(header.successor_index, 3);
        assert!(program.instructions[2].is_return());
        assert_eq!(program.instructions[3].successor_index, 2);
    }

    #[test]
    fn test_call_before_definition() {
        let program = preprocess("qreg q[1]; f q[0]; gate f a { x a; }").unwrap();
        let call = &program.instructions[1];
        assert!(call.is_function_call);
        assert_eq!(call.successor_index, 3);
        assert_eq!(call.call_substitution.get("a").map(String::as_str), Some("q[0]"));
    }

    #[test]
    fn test_gate_inside_controlled_block_is_not_callable() {
        let program =
            preprocess("qreg q[1]; creg c[1]; if (c==1) { gate g b { x b; } } g q[0];").unwrap();
        let call = &program.instructions[3];
        assert!(!call.is_function_call);
        assert!(call.called_function.is_none());
        assert_eq!(call.successor_index, 4);
        assert!(call.call_substitution.is_empty());
    }

    #[test]
    fn test_missing_body() {
        let err = preprocess("qreg q[1];\ngate f a;").unwrap_err();
        assert!(matches!(err, ParsingError::MissingBodyBlock { ref gate, .. } if gate == "f"));
        assert_eq!((err.line(), err.column()), (2, 1));
        assert_eq!(err.detail(), "Gate definitions require a body block.");
    }
}
