//! Lexical block context at a cursor position.
//!
//! The document is replayed from the top on every query. Nothing is cached:
//! the answer depends only on the text and the position.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::text::{Position, Range, byte_offset, scan_lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Project,
    Task,
    Resource,
    Account,
    Report,
    None,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Project => "project",
            BlockKind::Task => "task",
            BlockKind::Resource => "resource",
            BlockKind::Account => "account",
            BlockKind::Report => "report",
            BlockKind::None => "none",
        }
    }

    fn from_keyword(word: &str) -> Self {
        let mut parts = word.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("project"), _) => BlockKind::Project,
            (Some("task"), _) | (Some("supplement"), Some("task")) => BlockKind::Task,
            (Some("resource"), _) | (Some("supplement"), Some("resource")) => BlockKind::Resource,
            (Some("account"), _) => BlockKind::Account,
            (Some(w), _) if w.ends_with("report") => BlockKind::Report,
            _ => BlockKind::None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserContext {
    pub block_kind: BlockKind,
    pub block_id: Option<String>,
    pub block_start_line: u32,
    /// From the innermost block's opening line to the query position.
    pub block_range: Option<Range>,
    /// Kinds of all enclosing named blocks, outermost first, innermost included.
    pub parent_block_kinds: Vec<BlockKind>,
    /// Attributes already set directly in the innermost block.
    pub used_attribute_names: BTreeSet<String>,
}

impl Default for ParserContext {
    fn default() -> Self {
        Self {
            block_kind: BlockKind::None,
            block_id: None,
            block_start_line: 0,
            block_range: None,
            parent_block_kinds: Vec::new(),
            used_attribute_names: BTreeSet::new(),
        }
    }
}

impl ParserContext {
    pub fn in_block(&self) -> bool {
        self.block_kind != BlockKind::None
    }
}

static BLOCK_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(project|task|resource|account|supplement\s+task|supplement\s+resource|taskreport|resourcereport|textreport|tracereport|statussheetreport|nikureport|accountreport)\b(?:\s+([A-Za-z_][A-Za-z0-9_]*))?",
    )
    .expect("block opener regex")
});

static STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)(\s|$)").expect("statement regex"));

#[derive(Debug, Clone)]
struct OpenBlock {
    kind: BlockKind,
    id: Option<String>,
    start_line: u32,
}

impl OpenBlock {
    fn anonymous(line: u32) -> Self {
        Self {
            kind: BlockKind::None,
            id: None,
            start_line: line,
        }
    }
}

/// Block context at `pos`.
///
/// Braces that open something other than a known block (`journalentry ... {`,
/// `limits {`) are tracked as anonymous blocks so their closing brace does not
/// end the enclosing named block; they are never reported.
pub fn context_at(text: &str, pos: Position) -> ParserContext {
    let mut stack: Vec<OpenBlock> = Vec::new();
    let mut pending: Option<OpenBlock> = None;
    let mut replayed: Vec<(u32, String)> = Vec::new();

    for line in scan_lines(text).take(pos.line as usize + 1) {
        if !line.is_code() {
            continue;
        }
        let index = line.index as u32;
        let code = if index == pos.line {
            let cut = byte_offset(line.text, pos.character);
            line.code.get(..cut).unwrap_or(&line.code).to_string()
        } else {
            line.code.clone()
        };
        let trimmed = code.trim();
        if trimmed.is_empty() {
            continue;
        }

        let net = brace_balance(&code);
        let opener = BLOCK_OPENER.captures(&code).map(|caps| OpenBlock {
            kind: BlockKind::from_keyword(&caps[1]),
            id: caps.get(2).map(|m| m.as_str().to_string()),
            start_line: index,
        });

        if trimmed == "}" {
            stack.pop();
            pending = None;
        } else if net > 0 {
            let first = opener
                .or_else(|| pending.take().filter(|_| trimmed.starts_with('{')))
                .unwrap_or_else(|| OpenBlock::anonymous(index));
            stack.push(first);
            for _ in 1..net {
                stack.push(OpenBlock::anonymous(index));
            }
            pending = None;
        } else if !code.contains('{') {
            pending = opener;
        } else {
            pending = None;
        }

        replayed.push((index, code));
    }

    let Some(innermost) = stack.iter().rposition(|b| b.kind != BlockKind::None) else {
        return ParserContext::default();
    };
    let block = &stack[innermost];
    let used_attribute_names = used_attributes(&replayed, block.start_line, pos.line);

    ParserContext {
        block_kind: block.kind,
        block_id: block.id.clone(),
        block_start_line: block.start_line,
        block_range: Some(Range::new(Position::new(block.start_line, 0), pos)),
        parent_block_kinds: stack[..=innermost]
            .iter()
            .filter(|b| b.kind != BlockKind::None)
            .map(|b| b.kind)
            .collect(),
        used_attribute_names,
    }
}

fn used_attributes(lines: &[(u32, String)], start_line: u32, cursor_line: u32) -> BTreeSet<String> {
    let mut used = BTreeSet::new();
    let mut depth = 0i64;

    for (index, code) in lines.iter().filter(|(i, _)| *i > start_line) {
        if depth == 0 && !code.contains('{') {
            if let Some(caps) = STATEMENT.captures(code) {
                // the word being typed on the cursor line is not set yet
                let finished = *index != cursor_line || !caps[2].is_empty();
                if finished {
                    used.insert(caps[1].to_string());
                }
            }
        }
        depth = (depth + brace_balance(code)).max(0);
    }
    used
}

fn brace_balance(code: &str) -> i64 {
    code.bytes().fold(0, |acc, b| match b {
        b'{' => acc + 1,
        b'}' => acc - 1,
        _ => acc,
    })
}
