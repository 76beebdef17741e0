//! Symbol table extraction.
//!
//! Definitions are matched on masked code, one brace-delimited segment at a
//! time, so `task a "A" { task b "B" {} }` on a single line still yields a
//! nested hierarchy. Parents come from a per-kind scope stack driven by brace
//! depth; a symbol's parent is always of its own kind.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scope::{Opener, ScopeTracker};
use crate::text::{Range, scan_lines, span_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Task,
    Resource,
    Account,
    Scenario,
    Macro,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 5] = [
        SymbolKind::Task,
        SymbolKind::Resource,
        SymbolKind::Account,
        SymbolKind::Scenario,
        SymbolKind::Macro,
    ];

    /// Keyword that introduces a definition of this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            SymbolKind::Task => "task",
            SymbolKind::Resource => "resource",
            SymbolKind::Account => "account",
            SymbolKind::Scenario => "scenario",
            SymbolKind::Macro => "macro",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == word)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Kind-specific payload. Every nestable kind records the id of its enclosing
/// definition of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SymbolData {
    Task { parent: Option<String> },
    Resource { parent: Option<String> },
    Account { parent: Option<String> },
    Scenario { parent: Option<String> },
    Macro,
}

impl SymbolData {
    fn new(kind: SymbolKind, parent: Option<String>) -> Self {
        match kind {
            SymbolKind::Task => SymbolData::Task { parent },
            SymbolKind::Resource => SymbolData::Resource { parent },
            SymbolKind::Account => SymbolData::Account { parent },
            SymbolKind::Scenario => SymbolData::Scenario { parent },
            SymbolKind::Macro => SymbolData::Macro,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub id: String,
    pub name: String,
    /// The whole defining line.
    pub range: Range,
    /// Just the identifier after the keyword.
    pub id_range: Range,
    #[serde(flatten)]
    pub data: SymbolData,
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match self.data {
            SymbolData::Task { .. } => SymbolKind::Task,
            SymbolData::Resource { .. } => SymbolKind::Resource,
            SymbolData::Account { .. } => SymbolKind::Account,
            SymbolData::Scenario { .. } => SymbolKind::Scenario,
            SymbolData::Macro => SymbolKind::Macro,
        }
    }

    pub fn parent(&self) -> Option<&str> {
        match &self.data {
            SymbolData::Task { parent }
            | SymbolData::Resource { parent }
            | SymbolData::Account { parent }
            | SymbolData::Scenario { parent } => parent.as_deref(),
            SymbolData::Macro => None,
        }
    }
}

/// Every definition in a document, one list per kind, each in document order.
/// Duplicates are kept; reporting them is the validator's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    pub tasks: Vec<Symbol>,
    pub resources: Vec<Symbol>,
    pub accounts: Vec<Symbol>,
    pub scenarios: Vec<Symbol>,
    pub macros: Vec<Symbol>,
}

impl SymbolTable {
    pub fn of_kind(&self, kind: SymbolKind) -> &[Symbol] {
        match kind {
            SymbolKind::Task => &self.tasks,
            SymbolKind::Resource => &self.resources,
            SymbolKind::Account => &self.accounts,
            SymbolKind::Scenario => &self.scenarios,
            SymbolKind::Macro => &self.macros,
        }
    }

    fn of_kind_mut(&mut self, kind: SymbolKind) -> &mut Vec<Symbol> {
        match kind {
            SymbolKind::Task => &mut self.tasks,
            SymbolKind::Resource => &mut self.resources,
            SymbolKind::Account => &mut self.accounts,
            SymbolKind::Scenario => &mut self.scenarios,
            SymbolKind::Macro => &mut self.macros,
        }
    }

    /// First definition of `(kind, id)`.
    pub fn find(&self, kind: SymbolKind, id: &str) -> Option<&Symbol> {
        self.of_kind(kind).iter().find(|s| s.id == id)
    }

    pub fn contains(&self, kind: SymbolKind, id: &str) -> bool {
        self.find(kind, id).is_some()
    }

    /// Whether `id` is defined under any kind.
    pub fn id_exists(&self, id: &str) -> bool {
        SymbolKind::ALL.into_iter().any(|k| self.contains(k, id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        SymbolKind::ALL.into_iter().flat_map(|k| self.of_kind(k).iter())
    }

    pub fn in_document_order(&self) -> Vec<&Symbol> {
        let mut all: Vec<&Symbol> = self.iter().collect();
        all.sort_by_key(|s| s.range.start);
        all
    }

    pub fn len(&self) -> usize {
        SymbolKind::ALL.into_iter().map(|k| self.of_kind(k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(task|resource|account|scenario)\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s+["']([^"']*)["'])?"#)
        .expect("definition regex")
});

static MACRO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*macro\s+([A-Za-z_][A-Za-z0-9_]*)\s*\[").expect("macro regex"));

/// Parse every definition out of `text`.
pub fn extract_symbols(text: &str) -> SymbolTable {
    let mut table = SymbolTable::default();
    let mut scopes = ScopeTracker::new();

    for line in scan_lines(text).filter(|l| l.is_code()) {
        let line_range = Range::on_line(line.index as u32, 0, line.char_len());

        scopes.feed_line(&line.code, line.index as u32, |seg, scopes| {
            let code = &line.code[seg.start..seg.end];
            let at = |start: usize, end: usize| {
                span_range(line.index, line.text, seg.start + start, seg.start + end)
            };

            if let Some(caps) = DEFINITION.captures(code) {
                let Some(kind) = SymbolKind::from_keyword(&caps[1]) else {
                    return;
                };
                let Some(id) = caps.get(2) else {
                    return;
                };
                // names are blanked in `code`; read them back from the raw line
                let name = caps
                    .get(3)
                    .map(|m| line.text[seg.start + m.start()..seg.start + m.end()].to_string())
                    .unwrap_or_else(|| id.as_str().to_string());
                let parent = scopes.innermost(kind).map(|e| e.id.clone());

                table.of_kind_mut(kind).push(Symbol {
                    id: id.as_str().to_string(),
                    name,
                    range: line_range,
                    id_range: at(id.start(), id.end()),
                    data: SymbolData::new(kind, parent),
                });
            } else if let Some(id) = MACRO.captures(code).and_then(|caps| caps.get(1)) {
                table.macros.push(Symbol {
                    id: id.as_str().to_string(),
                    name: id.as_str().to_string(),
                    range: line_range,
                    id_range: at(id.start(), id.end()),
                    data: SymbolData::Macro,
                });
            }
        });
    }

    tracing::debug!(symbols = table.len(), "extracted symbols");
    table
}

/// Scope introduced by a definition at the start of `code`, if any.
pub(crate) fn definition_opener(code: &str, line: u32) -> Option<Opener> {
    let caps = DEFINITION.captures(code)?;
    Some(Opener {
        kind: SymbolKind::from_keyword(&caps[1])?,
        id: caps[2].to_string(),
        line,
    })
}
