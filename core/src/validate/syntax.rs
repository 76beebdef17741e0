use std::collections::HashMap;

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::text::{Position, Range, scan_lines};

/// Match every `{` with a `}`. Braces inside comments and strings do not count.
pub fn validate_braces(text: &str) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let mut open: Vec<Position> = Vec::new();

    for line in scan_lines(text) {
        for (byte, b) in line.code.bytes().enumerate() {
            let at = Position::new(line.index as u32, line.column(byte));
            match b {
                b'{' => open.push(at),
                b'}' if open.pop().is_none() => diags.push(Diagnostic::error(
                    single_char(at),
                    DiagnosticCode::UnmatchedClosingBrace,
                    "Unexpected closing brace - no matching opening brace",
                )),
                _ => {}
            }
        }
    }

    diags.extend(open.into_iter().map(|at| {
        Diagnostic::error(single_char(at), DiagnosticCode::UnclosedBrace, "Unclosed brace - missing closing brace")
    }));
    diags
}

fn single_char(at: Position) -> Range {
    Range::on_line(at.line, at.character, at.character + 1)
}

/// Report task, resource and account ids defined more than once: an error
/// on the repeated definition and a warning on the first one.
pub fn validate_duplicate_ids(symbols: &SymbolTable) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let mut first: HashMap<(SymbolKind, &str), &Symbol> = HashMap::new();

    for symbol in symbols.in_document_order() {
        let kind = symbol.kind();
        let Some((code, label)) = duplicate_code(kind) else {
            continue;
        };
        let Some(original) = first.get(&(kind, symbol.id.as_str())) else {
            first.insert((kind, symbol.id.as_str()), symbol);
            continue;
        };

        diags.push(Diagnostic::error(
            symbol.id_range,
            code,
            format!(
                "Duplicate {} ID '{}' - already defined at line {}",
                kind,
                symbol.id,
                original.range.start.line + 1
            ),
        ));
        diags.push(Diagnostic::warning(
            original.id_range,
            code,
            format!("{} ID '{}' is duplicated at line {}", label, symbol.id, symbol.range.start.line + 1),
        ));
    }
    diags
}

fn duplicate_code(kind: SymbolKind) -> Option<(DiagnosticCode, &'static str)> {
    match kind {
        SymbolKind::Task => Some((DiagnosticCode::DuplicateTaskId, "Task")),
        SymbolKind::Resource => Some((DiagnosticCode::DuplicateResourceId, "Resource")),
        SymbolKind::Account => Some((DiagnosticCode::DuplicateAccountId, "Account")),
        SymbolKind::Scenario | SymbolKind::Macro => None,
    }
}
