//! Positions, ranges and the line scanner every analysis pass is built on.

mod scanner;

pub use scanner::{Line, LineKind, LineScanner, scan_lines};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based line/column pair. `character` counts Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// Half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn on_line(line: u32, start: u32, end: u32) -> Self {
        Self {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }

    /// Whether a cursor at `pos` touches this range. The end column counts, so a
    /// cursor placed right after an identifier still selects it.
    pub fn touches(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}-{}", self.start, self.end.character + 1)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Character column of byte offset `byte` within `line`.
pub fn char_column(line: &str, byte: usize) -> u32 {
    let mut byte = byte.min(line.len());
    while !line.is_char_boundary(byte) {
        byte -= 1;
    }
    line[..byte].chars().count() as u32
}

/// Byte offset of character column `column` within `line`, clamped to the line end.
pub fn byte_offset(line: &str, column: u32) -> usize {
    line.char_indices()
        .nth(column as usize)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

/// Range covering bytes `start..end` of `line` at line index `index`.
pub fn span_range(index: usize, line: &str, start: usize, end: usize) -> Range {
    Range::on_line(index as u32, char_column(line, start), char_column(line, end))
}

/// Lines of `text` as the scanner sees them (`\n` separated, trailing `\r` dropped).
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l))
}

/// Raw text of line `index`, if it exists.
pub fn line_at(text: &str, index: u32) -> Option<&str> {
    split_lines(text).nth(index as usize)
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Identifier under (or directly before) the cursor, with its range.
pub fn word_at(text: &str, pos: Position) -> Option<(String, Range)> {
    let line = line_at(text, pos.line)?;
    let chars: Vec<char> = line.chars().collect();
    let col = (pos.character as usize).min(chars.len());

    let anchor = if col < chars.len() && is_ident_continue(chars[col]) {
        col
    } else if col > 0 && is_ident_continue(chars[col - 1]) {
        col - 1
    } else {
        return None;
    };

    let mut start = anchor;
    while start > 0 && is_ident_continue(chars[start - 1]) {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < chars.len() && is_ident_continue(chars[end]) {
        end += 1;
    }
    if !is_ident_start(chars[start]) {
        return None;
    }
    let word: String = chars[start..end].iter().collect();
    Some((word, Range::on_line(pos.line, start as u32, end as u32)))
}
