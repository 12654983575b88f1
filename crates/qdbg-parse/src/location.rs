//! Line and column lookup in the original source.

use crate::error::ErrorLocation;

/// A one-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

/// Locate a byte offset.
///
/// The column counts characters from the start of the line, so multi-byte
/// characters in comments do not shift it.
pub fn locate_offset(source: &str, offset: usize) -> LineColumn {
    let offset = char_floor(source, offset);
    let line_start = line_start(source, offset);
    LineColumn {
        line: source[..line_start].matches('\n').count() + 1,
        column: column_of(source, line_start, offset),
    }
}

/// Locate `target` on the line containing `offset`.
///
/// The first occurrence of `target` at or after `offset` on that line wins.
/// If the target is empty or does not appear verbatim (e.g. it was
/// synthesized by register unfolding), the column of the line's first
/// non-whitespace character is reported instead.
pub fn locate_target(source: &str, offset: usize, target: &str) -> LineColumn {
    let offset = char_floor(source, offset);
    let mut location = locate_offset(source, offset);
    let line_start = line_start(source, offset);
    let line_end = source[offset..]
        .find('\n')
        .map_or(source.len(), |i| offset + i);

    if !target.is_empty() {
        if let Some(found) = source[offset..line_end].find(target) {
            location.column = column_of(source, line_start, offset + found);
            return location;
        }
    }

    if let Some(first) = source[line_start..line_end].find(|c: char| c != ' ' && c != '\t') {
        location.column = column_of(source, line_start, line_start + first);
    }
    location
}

/// Builds [`ErrorLocation`]s against the full original source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Locator<'a> {
    source: &'a str,
    source_name: &'a str,
}

impl<'a> Locator<'a> {
    pub(crate) fn new(source: &'a str, source_name: &'a str) -> Self {
        Self {
            source,
            source_name,
        }
    }

    /// Location of the line containing `offset`, at its first non-blank
    /// column. Used for errors that do not name a target.
    pub(crate) fn at(&self, offset: usize, detail: impl Into<String>) -> ErrorLocation {
        self.build(locate_target(self.source, offset, ""), detail)
    }

    /// Location of `target` within the instruction starting at `offset`.
    pub(crate) fn at_target(
        &self,
        offset: usize,
        target: &str,
        detail: impl Into<String>,
    ) -> ErrorLocation {
        self.build(locate_target(self.source, offset, target), detail)
    }

    fn build(&self, at: LineColumn, detail: impl Into<String>) -> ErrorLocation {
        ErrorLocation {
            source_name: self.source_name.to_string(),
            line: at.line,
            column: at.column,
            detail: detail.into(),
        }
    }
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn column_of(source: &str, line_start: usize, offset: usize) -> usize {
    source[line_start..offset].chars().count() + 1
}

/// Clamp `offset` into `source` and move it back onto a char boundary.
fn char_floor(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
