//! The preprocessing pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use qdbg_ir::{Block, FunctionDefinition, Instruction, InstructionKind};

use crate::assertion::{AssertionParser, NoAssertions};
use crate::classify::classify;
use crate::dependencies::link_dependencies;
use crate::error::{ParseResult, ParsingError};
use crate::inline::{FunctionTable, resolve_calls, sweep_function_names};
use crate::location::Locator;
use crate::operands::extract_operands;
use crate::sanitize::{Statement, sanitize};
use crate::validate::{
    Scope, TargetViolation, check_targets, parse_register_declaration, unfold_assertion_targets,
};

/// Preprocessor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Label used in place of a file name in error messages.
    pub source_name: String,
    /// Expand bare register names in assertion targets to every index.
    pub unfold_assertion_registers: bool,
    /// Compute backward data dependencies.
    pub link_dependencies: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            source_name: "<input>".to_string(),
            unfold_assertion_registers: true,
            link_dependencies: true,
        }
    }
}

/// The flat program handed to the stepping engine.
#[derive(Debug)]
pub struct PreprocessedProgram {
    /// The source with comments blanked out.
    pub processed_code: String,
    /// Every instruction, gate bodies inlined, ordered by index.
    pub instructions: Vec<Instruction>,
    /// Declared registers and their sizes.
    pub registers: BTreeMap<String, usize>,
    /// User-defined gates, each listed once its body is complete, so nested
    /// gates precede the gate enclosing them.
    pub functions: Vec<FunctionDefinition>,
}

impl PreprocessedProgram {
    /// Look up an instruction by index.
    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        let first = self.instructions.first()?.index;
        self.instructions.get(index.checked_sub(first)?)
    }

    /// Look up a user-defined gate by name.
    pub fn function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Turns program text into the flat debugger IR.
pub struct Preprocessor {
    options: PreprocessOptions,
    assertions: Box<dyn AssertionParser>,
}

impl Preprocessor {
    /// Create a preprocessor with default options and no assertion support.
    pub fn new() -> Self {
        Self {
            options: PreprocessOptions::default(),
            assertions: Box::new(NoAssertions),
        }
    }

    /// Replace all options.
    #[must_use]
    pub fn with_options(mut self, options: PreprocessOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the label used in error messages.
    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.options.source_name = name.into();
        self
    }

    /// Set the assertion grammar.
    #[must_use]
    pub fn with_assertion_parser(mut self, parser: impl AssertionParser + 'static) -> Self {
        self.assertions = Box::new(parser);
        self
    }

    /// Preprocess a whole program.
    #[instrument(skip_all, fields(source = %self.options.source_name, bytes = code.len()))]
    pub fn preprocess(&self, code: &str) -> ParseResult<PreprocessedProgram> {
        let locator = Locator::new(code, &self.options.source_name);
        let mut pipeline = Pipeline {
            locator,
            options: &self.options,
            assertions: self.assertions.as_ref(),
            next_index: 0,
            functions: FunctionTable::default(),
        };

        let run = pipeline.run(code, 0, Scope::new())?;
        let mut instructions = run.instructions;

        resolve_calls(&mut instructions, &pipeline.functions, &locator)?;
        if self.options.link_dependencies {
            link_dependencies(&mut instructions);
        }

        debug!(
            "Preprocessed {} instructions, {} gates",
            instructions.len(),
            pipeline.functions.len()
        );

        Ok(PreprocessedProgram {
            processed_code: run.processed_code,
            instructions,
            registers: run.scope.into_registers().into_iter().collect(),
            functions: pipeline.functions.into_definitions(),
        })
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Preprocess `code` with default options.
pub fn preprocess(code: &str) -> ParseResult<PreprocessedProgram> {
    Preprocessor::new().preprocess(code)
}

/// Output of one run: the top level or a gate body.
pub(crate) struct Run {
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) processed_code: String,
    pub(crate) scope: Scope,
}

/// State shared by all runs of one top-level call.
pub(crate) struct Pipeline<'a> {
    pub(crate) locator: Locator<'a>,
    pub(crate) options: &'a PreprocessOptions,
    pub(crate) assertions: &'a dyn AssertionParser,
    /// Index of the next instruction to create.
    pub(crate) next_index: usize,
    pub(crate) functions: FunctionTable,
}

impl Pipeline<'_> {
    /// Preprocess `code`, which starts at `base` in the original source.
    pub(crate) fn run(&mut self, code: &str, base: usize, mut scope: Scope) -> ParseResult<Run> {
        let sanitized = sanitize(code, base);
        scope.add_functions(sweep_function_names(&sanitized.stripped));

        let mut instructions = Vec::new();
        for statement in sanitized.statements() {
            let kind = classify(statement.text, self.assertions);
            if kind == InstructionKind::FunctionDefinition {
                let inlined = self.inline_definition(&statement, base, &mut scope)?;
                instructions.extend(inlined);
                continue;
            }
            let instruction = self.instruction(&statement, kind, &mut scope)?;
            trace!(index = instruction.index, code = %instruction.code.trim(), "instruction");
            instructions.push(instruction);
        }

        Ok(Run {
            instructions,
            processed_code: sanitized.stripped,
            scope,
        })
    }

    /// Build a single non-definition instruction.
    fn instruction(
        &mut self,
        statement: &Statement<'_>,
        kind: InstructionKind,
        scope: &mut Scope,
    ) -> ParseResult<Instruction> {
        let mut code = statement.text.to_string();
        let mut block = statement.block.map(|b| Block::new(b.content.as_str()));

        if kind == InstructionKind::ClassicControlled {
            if let Some(body) = block.take() {
                code = format!("{code} {{ {} }}", body.code);
            }
        }

        let mut targets = extract_operands(&code, kind);
        let mut assertion = None;

        match kind {
            InstructionKind::VariableDeclaration => {
                let declaration = code.trim();
                let Some((name, size)) = parse_register_declaration(declaration) else {
                    return Err(ParsingError::InvalidRegisterDeclaration {
                        declaration: declaration.to_string(),
                        location: self.locator.at(
                            statement.start,
                            format!("Invalid register declaration {declaration}."),
                        ),
                    });
                };
                scope.declare_register(name, size);
            }
            InstructionKind::Assertion => {
                let invalid = |source: qdbg_ir::AssertionError| ParsingError::InvalidAssertion {
                    location: self.locator.at(statement.start, source.to_string()),
                    source,
                };
                let mut parsed = self
                    .assertions
                    .parse(&code, block.as_ref().map(|b| b.code.as_str()))
                    .map_err(invalid)?;
                if self.options.unfold_assertion_registers {
                    unfold_assertion_targets(parsed.as_mut(), scope);
                }
                parsed.validate().map_err(invalid)?;
                check_targets(parsed.target_qubits(), scope)
                    .map_err(|v| self.target_error(v, statement.start, " in assertion"))?;
                targets = parsed.target_qubits().to_vec();
                assertion = Some(parsed);
            }
            _ => {
                check_targets(&targets, scope)
                    .map_err(|v| self.target_error(v, statement.start, ""))?;
            }
        }

        let index = self.next_index;
        self.next_index += 1;

        let mut instruction =
            Instruction::new(index, code, kind, targets, statement.start..statement.end)
                .with_block(block);
        if let Some(assertion) = assertion {
            instruction = instruction.with_assertion(assertion);
        }

        if let Some(callee) = instruction.code.split_whitespace().next() {
            if scope.knows_function(callee) {
                instruction.is_function_call = true;
                instruction.called_function = Some(callee.to_string());
            }
        }

        Ok(instruction)
    }

    fn target_error(&self, violation: TargetViolation, start: usize, context: &str) -> ParsingError {
        match violation {
            TargetViolation::Empty => ParsingError::EmptyTarget {
                location: self.locator.at(start, format!("Empty target{context}.")),
            },
            TargetViolation::Invalid(target) => {
                let detail = format!("Invalid target qubit {target}{context}.");
                ParsingError::InvalidTargetQubit {
                    location: self.locator.at_target(start, &target, detail),
                    target,
                }
            }
        }
    }
}
