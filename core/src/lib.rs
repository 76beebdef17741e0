//! Language intelligence for TaskJuggler project files: symbols, block
//! context, references, validation and the cursor queries built on them.

pub mod completion;
pub mod context;
pub mod diagnostic;
pub mod keywords;
pub mod navigation;
pub mod options;
pub mod references;
mod scope;
pub mod symbols;
pub mod text;
pub mod validate;
pub mod workspace;

#[cfg(test)]
mod context_test;
#[cfg(test)]
mod symbols_test;

use serde::Serialize;

pub use completion::{CandidateKind, CompletionCandidate, complete_at};
pub use context::{BlockKind, ParserContext, context_at};
pub use diagnostic::{DIAGNOSTIC_SOURCE, Diagnostic, DiagnosticCode, Severity};
pub use navigation::{
    OutlineNode, RenameError, SymbolTarget, TextEdit, definition, document_outline, find_references, plan_rename,
    prepare_rename, symbol_at,
};
pub use options::AnalysisOptions;
pub use references::{Reference, ReferenceContext, extract_references};
pub use symbols::{Symbol, SymbolData, SymbolKind, SymbolTable, extract_symbols};
pub use text::{Position, Range};
pub use validate::validate_document;
pub use workspace::{Cancelled, WorkspaceOptions, WorkspaceSymbol, search_workspace};

/// Everything one pass over a document produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentAnalysis {
    pub symbols: SymbolTable,
    pub references: Vec<Reference>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentAnalysis {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Parse `text` once and run every validator over the result.
pub fn analyze(text: &str, options: &AnalysisOptions) -> DocumentAnalysis {
    let symbols = extract_symbols(text);
    let references = extract_references(text);
    let diagnostics = validate::validate_parsed(text, &symbols, &references, options);
    tracing::debug!(
        symbols = symbols.len(),
        references = references.len(),
        diagnostics = diagnostics.len(),
        "analyzed document"
    );
    DocumentAnalysis {
        symbols,
        references,
        diagnostics,
    }
}
