//! Conversions between core values (character columns) and LSP values
//! (UTF-16 columns).

use ropey::Rope;
use tjls_core::{OutlineNode, Severity, SymbolKind as CoreSymbolKind};
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticSeverity, DocumentSymbol, NumberOrString, Position, Range, SymbolKind,
};

/// Line/column mapping for one document snapshot.
#[derive(Debug, Clone)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    pub fn from_rope(rope: Rope) -> Self {
        Self { rope }
    }

    /// Characters of line `line` without its line break.
    fn line_chars(&self, line: u32) -> Option<impl Iterator<Item = char> + '_> {
        let idx = line as usize;
        if idx >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(idx);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
        Some(slice.chars().take(len))
    }

    pub fn to_lsp_position(&self, pos: tjls_core::Position) -> Position {
        let character = match self.line_chars(pos.line) {
            Some(chars) => chars
                .take(pos.character as usize)
                .map(|c| c.len_utf16() as u32)
                .sum(),
            None => pos.character,
        };
        Position::new(pos.line, character)
    }

    /// UTF-16 column to character column, clamped to the line end.
    pub fn to_core_position(&self, pos: Position) -> tjls_core::Position {
        let Some(chars) = self.line_chars(pos.line) else {
            return tjls_core::Position::new(pos.line, pos.character);
        };
        let mut seen_utf16 = 0u32;
        let mut column = 0u32;
        for ch in chars {
            let width = ch.len_utf16() as u32;
            if seen_utf16 + width > pos.character {
                break;
            }
            seen_utf16 += width;
            column += 1;
        }
        tjls_core::Position::new(pos.line, column)
    }

    pub fn to_lsp_range(&self, range: tjls_core::Range) -> Range {
        Range::new(self.to_lsp_position(range.start), self.to_lsp_position(range.end))
    }
}

pub fn to_lsp_diagnostic(index: &LineIndex, diag: &tjls_core::Diagnostic) -> Diagnostic {
    Diagnostic {
        range: index.to_lsp_range(diag.range),
        severity: Some(match diag.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
        }),
        code: Some(NumberOrString::String(diag.code.as_str().to_string())),
        source: Some(diag.source.to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

pub fn to_lsp_symbol_kind(kind: CoreSymbolKind) -> SymbolKind {
    match kind {
        CoreSymbolKind::Task => SymbolKind::FUNCTION,
        CoreSymbolKind::Resource => SymbolKind::CLASS,
        CoreSymbolKind::Account => SymbolKind::ENUM,
        CoreSymbolKind::Scenario => SymbolKind::NAMESPACE,
        CoreSymbolKind::Macro => SymbolKind::CONSTANT,
    }
}

/// Outline label, e.g. `design - Design phase`.
pub fn symbol_label(symbol: &tjls_core::Symbol) -> String {
    format!("{} - {}", symbol.id, symbol.name)
}

pub fn to_document_symbol(index: &LineIndex, node: &OutlineNode) -> DocumentSymbol {
    let symbol = &node.symbol;
    let children: Vec<DocumentSymbol> = node.children.iter().map(|c| to_document_symbol(index, c)).collect();
    DocumentSymbol {
        name: symbol_label(symbol),
        detail: Some(
            node.detail
                .clone()
                .unwrap_or_else(|| symbol.kind().keyword().to_string()),
        ),
        kind: to_lsp_symbol_kind(symbol.kind()),
        tags: None,
        #[allow(deprecated)]
        deprecated: None,
        range: index.to_lsp_range(node.extent),
        selection_range: index.to_lsp_range(symbol.id_range),
        children: (!children.is_empty()).then_some(children),
    }
}
