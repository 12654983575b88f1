//! Comment stripping, block extraction and statement splitting.
//!
//! The sanitizer keeps every position in terms of the original source:
//! comments are blanked in place so offsets never move, and removed blocks
//! are recorded in a [`SourceMap`].

use std::ops::Range;

use crate::lexer::{SpannedToken, Token, tokenize};
use crate::source_map::SourceMap;

/// Replace every `//` comment with spaces, up to the end of its line.
///
/// The result has the same byte length and the same newline positions as
/// `code`.
pub fn remove_comments(code: &str) -> String {
    let mut result = String::with_capacity(code.len());
    for SpannedToken { token, span } in tokenize(code) {
        if token == Token::Comment {
            result.push_str(&" ".repeat(span.len()));
        } else {
            result.push_str(&code[span]);
        }
    }
    result
}

/// A top-level `{ ... }` block removed from the working text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBlock {
    /// Text between the braces. Nested braces are kept verbatim.
    pub content: String,
    /// Offset in the working text where the block used to start.
    pub working_offset: usize,
    /// Span of the block in the input text, braces included.
    pub span: Range<usize>,
}

impl ExtractedBlock {
    /// Input offset of the opening brace.
    pub fn open_brace(&self) -> usize {
        self.span.start
    }

    /// Input offset of the closing brace.
    pub fn close_brace(&self) -> usize {
        self.span.end - 1
    }
}

/// Working text with all top-level blocks moved into a side table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSweep {
    /// Input text with every top-level block removed.
    pub text: String,
    /// Removed blocks, in source order.
    pub blocks: Vec<ExtractedBlock>,
}

impl BlockSweep {
    /// Put every block back at its working offset.
    pub fn restore(&self) -> String {
        let mut restored = String::with_capacity(self.text.len());
        let mut copied = 0;
        for block in &self.blocks {
            restored.push_str(&self.text[copied..block.working_offset]);
            restored.push('{');
            restored.push_str(&block.content);
            restored.push('}');
            copied = block.working_offset;
        }
        restored.push_str(&self.text[copied..]);
        restored
    }
}

/// Move every top-level brace pair out of `code`.
///
/// Only a brace that brings the nesting depth back to zero closes a block. A
/// stray `}` at depth zero is left in place, and an unclosed `{` leaves the
/// rest of the text untouched.
pub fn sweep_blocks(code: &str) -> BlockSweep {
    let mut text = String::with_capacity(code.len());
    let mut blocks = Vec::new();
    let mut depth = 0_usize;
    let mut open = 0;
    let mut copied = 0;

    for SpannedToken { token, span } in tokenize(code) {
        match token {
            Token::LBrace => {
                if depth == 0 {
                    open = span.start;
                }
                depth += 1;
            }
            Token::RBrace if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    text.push_str(&code[copied..open]);
                    blocks.push(ExtractedBlock {
                        content: code[open + 1..span.start].to_string(),
                        working_offset: text.len(),
                        span: open..span.end,
                    });
                    copied = span.end;
                }
            }
            _ => {}
        }
    }
    text.push_str(&code[copied..]);

    BlockSweep { text, blocks }
}

/// One instruction cut out of the working text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement<'a> {
    /// Instruction text. Includes the terminating `;` unless a block ended it.
    pub text: &'a str,
    /// Original offset of the first non-whitespace character.
    pub start: usize,
    /// Original offset of the terminating `;` or closing `}`.
    pub end: usize,
    /// The block that terminated the instruction, if any.
    pub block: Option<&'a ExtractedBlock>,
}

/// A fully sanitized run of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// Input with comments blanked, blocks still in place.
    pub stripped: String,
    /// Stripped input with blocks removed.
    pub sweep: BlockSweep,
    /// Working-text to original-source mapping.
    pub map: SourceMap,
}

/// Sanitize a run of text that starts at `base` in the original source.
pub fn sanitize(code: &str, base: usize) -> Sanitized {
    let stripped = remove_comments(code);
    let sweep = sweep_blocks(&stripped);

    let mut map = SourceMap::identity(base);
    for block in &sweep.blocks {
        map.push_removal(block.working_offset, block.span.end);
    }

    Sanitized {
        stripped,
        sweep,
        map,
    }
}

impl Sanitized {
    /// Split the working text into statements.
    ///
    /// A statement ends at a `;` or at a removed block, whichever comes
    /// first. Statements that are empty apart from their `;` are dropped, as
    /// is trailing text without a terminator.
    pub fn statements(&self) -> Vec<Statement<'_>> {
        let text = self.sweep.text.as_str();
        let blocks = &self.sweep.blocks;
        let mut statements = Vec::new();
        let mut next_block = 0;
        let mut pos = 0;

        loop {
            let semicolon = text[pos..].find(';').map(|i| pos + i);
            let block = blocks
                .get(next_block)
                .filter(|b| semicolon.is_none_or(|s| b.working_offset <= s));

            let body_start = pos;
            let (body, end, block) = match (block, semicolon) {
                (Some(block), _) => {
                    next_block += 1;
                    pos = block.working_offset;
                    let end = self.map.input_to_original(block.close_brace());
                    (&text[body_start..pos], end, Some(block))
                }
                (None, Some(s)) => {
                    pos = s + 1;
                    (&text[body_start..pos], self.map.to_original(s), None)
                }
                (None, None) => break,
            };

            if block.is_none() && body.trim_end_matches(';').trim().is_empty() {
                continue;
            }

            let leading = body
                .find(|c: char| !matches!(c, ' ' | '\t' | '\r' | '\n'))
                .unwrap_or(0);
            statements.push(Statement {
                text: body,
                start: self.map.to_original(body_start + leading),
                end,
                block,
            });
        }

        statements
    }
}
