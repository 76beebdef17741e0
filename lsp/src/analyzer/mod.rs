use tjls_core::{AnalysisOptions, analyze, document_outline};
use tower_lsp::lsp_types::{Diagnostic, DocumentSymbol};

mod completions;
mod convert;

pub use completions::{hover_markdown, to_completion_item};
pub use convert::{LineIndex, symbol_label, to_document_symbol, to_lsp_diagnostic, to_lsp_symbol_kind};

pub const DEFAULT_MAX_DIAGNOSTICS: usize = 500;

/// Result of analyzing one TaskJuggler document, already in LSP shape.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: Vec<DocumentSymbol>,
    pub error_count: usize,
}

/// Runs the core analysis and converts the result for the editor.
#[derive(Debug, Clone)]
pub struct TjAnalyzer {
    options: AnalysisOptions,
    max_diagnostics: usize,
}

impl Default for TjAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TjAnalyzer {
    pub fn new() -> Self {
        Self {
            options: AnalysisOptions::default(),
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
        }
    }

    pub fn with_options(options: AnalysisOptions, max_diagnostics: usize) -> Self {
        Self {
            options,
            max_diagnostics,
        }
    }

    pub fn analyze(&self, content: &str) -> AnalysisResult {
        self.analyze_indexed(content, &LineIndex::new(content))
    }

    /// Same as [`TjAnalyzer::analyze`] with a line index the caller already built.
    pub fn analyze_indexed(&self, content: &str, index: &LineIndex) -> AnalysisResult {
        let analysis = analyze(content, &self.options);
        let error_count = analysis.error_count();

        let mut diagnostics: Vec<Diagnostic> = analysis
            .diagnostics
            .iter()
            .map(|d| to_lsp_diagnostic(index, d))
            .collect();
        if diagnostics.len() > self.max_diagnostics {
            tracing::debug!(
                total = diagnostics.len(),
                kept = self.max_diagnostics,
                "truncating diagnostics"
            );
            diagnostics.truncate(self.max_diagnostics);
        }

        let symbols = document_outline(content, &analysis.symbols)
            .iter()
            .map(|node| to_document_symbol(index, node))
            .collect();

        AnalysisResult {
            diagnostics,
            symbols,
            error_count,
        }
    }
}
