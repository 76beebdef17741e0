//! Cursor-driven queries: go to definition, find references, rename, outline.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::references::{Reference, extract_references};
use crate::symbols::{Symbol, SymbolKind, SymbolTable, extract_symbols};
use crate::text::{Line, Position, Range, byte_offset, scan_lines, word_at};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

static STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)").expect("statement regex"));

/// What the cursor points at: a `(kind, id)` pair plus the range of the word
/// under the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolTarget {
    pub kind: SymbolKind,
    pub id: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameError {
    InvalidIdentifier(String),
    AlreadyExists(String),
    NoSymbol,
}

impl fmt::Display for RenameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameError::InvalidIdentifier(name) => write!(
                f,
                "'{name}' is not a valid identifier: use letters, digits and '_', not starting with a digit"
            ),
            RenameError::AlreadyExists(name) => write!(f, "an identifier named '{name}' already exists"),
            RenameError::NoSymbol => f.write_str("no renameable symbol at this position"),
        }
    }
}

impl std::error::Error for RenameError {}

/// Parsed view of one document for cursor queries.
#[derive(Debug, Clone)]
pub struct Navigator<'a> {
    text: &'a str,
    symbols: SymbolTable,
    references: Vec<Reference>,
}

impl<'a> Navigator<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            symbols: extract_symbols(text),
            references: extract_references(text),
        }
    }

    /// Reuse parse results the caller already holds.
    pub fn from_parts(text: &'a str, symbols: SymbolTable, references: Vec<Reference>) -> Self {
        Self {
            text,
            symbols,
            references,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Resolve the word under the cursor. A definition identifier or a
    /// reference wins; otherwise a bare word naming a task, resource or
    /// account (in that order) resolves too.
    pub fn symbol_at(&self, pos: Position) -> Option<SymbolTarget> {
        let (word, range) = word_at(self.text, pos)?;

        if let Some(sym) = self.symbols.iter().find(|s| s.id_range.touches(pos) && s.id == word) {
            return Some(SymbolTarget {
                kind: sym.kind(),
                id: sym.id.clone(),
                range,
            });
        }
        if let Some(r) = self
            .references
            .iter()
            .find(|r| r.source_range.touches(pos) && r.target_id == word)
        {
            return Some(SymbolTarget {
                kind: r.kind,
                id: r.target_id.clone(),
                range,
            });
        }
        [SymbolKind::Task, SymbolKind::Resource, SymbolKind::Account]
            .into_iter()
            .find(|&kind| self.symbols.contains(kind, &word))
            .map(|kind| SymbolTarget { kind, id: word, range })
    }

    pub fn definition(&self, pos: Position) -> Option<&Symbol> {
        let target = self.symbol_at(pos)?;
        self.symbols.find(target.kind, &target.id)
    }

    /// Ranges of every use of the symbol under the cursor, optionally with
    /// its definitions first.
    pub fn find_references(&self, pos: Position, include_declaration: bool) -> Vec<Range> {
        let Some(target) = self.symbol_at(pos) else {
            return Vec::new();
        };
        let mut ranges: Vec<Range> = Vec::new();
        if include_declaration {
            ranges.extend(
                self.symbols
                    .of_kind(target.kind)
                    .iter()
                    .filter(|s| s.id == target.id)
                    .map(|s| s.id_range),
            );
        }
        ranges.extend(
            self.references
                .iter()
                .filter(|r| r.kind == target.kind && r.target_id == target.id)
                .map(|r| r.source_range),
        );
        ranges
    }

    /// Range and current text of the renameable identifier under the cursor.
    pub fn prepare_rename(&self, pos: Position) -> Option<(Range, String)> {
        self.rename_target(pos).map(|t| (t.range, t.id))
    }

    /// Edits renaming the symbol under the cursor: every definition
    /// identifier plus every reference, sorted by position.
    pub fn plan_rename(&self, pos: Position, new_name: &str) -> Result<Vec<TextEdit>, RenameError> {
        if !IDENTIFIER.is_match(new_name) {
            return Err(RenameError::InvalidIdentifier(new_name.to_string()));
        }
        let target = self.rename_target(pos).ok_or(RenameError::NoSymbol)?;
        if self.symbols.id_exists(new_name) {
            return Err(RenameError::AlreadyExists(new_name.to_string()));
        }

        let mut ranges = self.find_references(pos, true);
        ranges.sort();
        ranges.dedup();
        tracing::debug!(id = %target.id, to = new_name, edits = ranges.len(), "planned rename");
        Ok(ranges
            .into_iter()
            .map(|range| TextEdit {
                range,
                new_text: new_name.to_string(),
            })
            .collect())
    }

    /// Only kinds that references can point at are renamed.
    fn rename_target(&self, pos: Position) -> Option<SymbolTarget> {
        self.symbol_at(pos)
            .filter(|t| matches!(t.kind, SymbolKind::Task | SymbolKind::Resource | SymbolKind::Account))
    }
}

pub fn symbol_at(text: &str, pos: Position) -> Option<SymbolTarget> {
    Navigator::new(text).symbol_at(pos)
}

pub fn definition(text: &str, pos: Position) -> Option<Symbol> {
    Navigator::new(text).definition(pos).cloned()
}

pub fn find_references(text: &str, pos: Position, include_declaration: bool) -> Vec<Range> {
    Navigator::new(text).find_references(pos, include_declaration)
}

pub fn prepare_rename(text: &str, pos: Position) -> Option<(Range, String)> {
    Navigator::new(text).prepare_rename(pos)
}

pub fn plan_rename(text: &str, pos: Position, new_name: &str) -> Result<Vec<TextEdit>, RenameError> {
    Navigator::new(text).plan_rename(pos, new_name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    pub symbol: Symbol,
    /// Short summary of a few block attributes, e.g. `effort 5d, allocate dev`.
    pub detail: Option<String>,
    /// From the defining line through the closing brace.
    pub extent: Range,
    pub children: Vec<OutlineNode>,
}

/// Tasks, resources, accounts and scenarios nested by parent, each group in
/// document order.
pub fn document_outline(text: &str, symbols: &SymbolTable) -> Vec<OutlineNode> {
    let lines: Vec<Line<'_>> = scan_lines(text).collect();
    let mut roots = Vec::new();

    for kind in [SymbolKind::Task, SymbolKind::Resource, SymbolKind::Account, SymbolKind::Scenario] {
        let all = symbols.of_kind(kind);
        let mut children: HashMap<&str, Vec<&Symbol>> = HashMap::new();
        let mut top: Vec<&Symbol> = Vec::new();
        for sym in all {
            match sym.parent() {
                Some(parent) if all.iter().any(|s| s.id == parent) => {
                    children.entry(parent).or_default().push(sym)
                }
                _ => top.push(sym),
            }
        }
        let mut seen = HashSet::new();
        roots.extend(top.into_iter().map(|sym| outline_node(&lines, sym, &children, &mut seen)));
    }
    roots
}

fn outline_node<'s>(
    lines: &[Line<'_>],
    sym: &'s Symbol,
    children: &HashMap<&str, Vec<&'s Symbol>>,
    seen: &mut HashSet<&'s str>,
) -> OutlineNode {
    let (extent, attributes) = block_summary(lines, sym);
    // duplicate ids share one child list; attach it to the first only
    let kids = if seen.insert(sym.id.as_str()) {
        children.get(sym.id.as_str()).cloned().unwrap_or_default()
    } else {
        Vec::new()
    };
    OutlineNode {
        symbol: sym.clone(),
        detail: summarize(sym.kind(), &attributes),
        extent,
        children: kids
            .into_iter()
            .map(|child| outline_node(lines, child, children, seen))
            .collect(),
    }
}

fn summarize(kind: SymbolKind, attributes: &[(String, String)]) -> Option<String> {
    let wanted: &[&str] = match kind {
        SymbolKind::Task => &["effort", "duration", "allocate", "milestone"],
        SymbolKind::Resource => &["rate", "efficiency"],
        _ => &[],
    };
    let parts: Vec<String> = wanted
        .iter()
        .filter_map(|key| attributes.iter().find(|(k, _)| k == key))
        .map(|(k, v)| if v.is_empty() { k.clone() } else { format!("{k} {v}") })
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Extent of a definition's block and the `(keyword, value)` statements
/// directly inside it.
fn block_summary(lines: &[Line<'_>], sym: &Symbol) -> (Range, Vec<(String, String)>) {
    let first_line = sym.id_range.start.line as usize;
    let mut attributes = Vec::new();
    let mut depth = 0i64;
    let mut opened = false;

    for line in lines.iter().skip(first_line).filter(|l| l.is_code()) {
        let from = if line.index == first_line {
            byte_offset(line.text, sym.id_range.end.character)
        } else {
            0
        };
        let code = &line.code[from..];
        if !opened && line.index > first_line && !code.trim_start().starts_with('{') {
            break;
        }
        if opened && depth == 1 && !code.contains('{') {
            if let Some(stmt) = statement(line, from) {
                attributes.push(stmt);
            }
        }
        for (offset, b) in code.bytes().enumerate() {
            match b {
                b'{' => {
                    depth += 1;
                    opened = true;
                }
                b'}' => {
                    depth -= 1;
                    if opened && depth <= 0 {
                        let end = Position::new(line.index as u32, line.column(from + offset + 1));
                        return (Range::new(sym.range.start, end), attributes);
                    }
                }
                _ => {}
            }
        }
    }

    if opened {
        let end = lines
            .last()
            .map(|l| Position::new(l.index as u32, l.char_len()))
            .unwrap_or(sym.range.end);
        return (Range::new(sym.range.start, end), attributes);
    }
    (sym.range, attributes)
}

fn statement(line: &Line<'_>, from: usize) -> Option<(String, String)> {
    let code = &line.code[from..];
    let caps = STATEMENT.captures(code)?;
    let word = caps.get(1)?;
    let value_start = from + word.end();
    let value_end = from + code.trim_end().len();
    let value = line.text.get(value_start..value_end.max(value_start)).unwrap_or_default().trim();
    Some((word.as_str().to_string(), value.to_string()))
}
