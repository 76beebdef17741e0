//! Validation passes and the orchestrator that runs them.
//!
//! Every pass is independent: a panic inside one is caught, logged and
//! treated as "no diagnostics" so the remaining passes still report.

pub mod dates;
pub mod semantic;
pub mod syntax;

#[cfg(test)]
mod dates_test;
#[cfg(test)]
mod semantic_test;

use std::panic::{self, AssertUnwindSafe};

use crate::diagnostic::Diagnostic;
use crate::options::AnalysisOptions;
use crate::references::{Reference, extract_references};
use crate::symbols::{SymbolTable, extract_symbols};

pub use dates::{DateError, parse_date, validate_date_format, validate_date_logic, validate_dates};
pub use semantic::{DependencyGraph, validate_circular_dependencies, validate_references};
pub use syntax::{validate_braces, validate_duplicate_ids};

/// Run every validator over `text`: dates, braces, duplicate ids, undefined
/// references, then dependency cycles.
pub fn validate_document(text: &str, options: &AnalysisOptions) -> Vec<Diagnostic> {
    let symbols = guarded("symbols", || extract_symbols(text)).unwrap_or_default();
    let references = guarded("references", || extract_references(text)).unwrap_or_default();
    validate_parsed(text, &symbols, &references, options)
}

/// Same as [`validate_document`] for callers that already hold the parse results.
pub fn validate_parsed(
    text: &str,
    symbols: &SymbolTable,
    references: &[Reference],
    options: &AnalysisOptions,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    run_pass(&mut out, "dates", || validate_dates(text));
    run_pass(&mut out, "braces", || validate_braces(text));
    run_pass(&mut out, "duplicate-ids", || validate_duplicate_ids(symbols));
    run_pass(&mut out, "references", || validate_references(symbols, references, options));
    run_pass(&mut out, "cycles", || validate_circular_dependencies(symbols, references));
    out
}

fn run_pass(out: &mut Vec<Diagnostic>, name: &str, pass: impl FnOnce() -> Vec<Diagnostic>) {
    if let Some(diags) = guarded(name, pass) {
        tracing::trace!(pass = name, count = diags.len(), "validator finished");
        out.extend(diags);
    }
}

pub(crate) fn guarded<T>(pass: &str, f: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(pass, %reason, "analysis pass failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;
    use crate::text::Range;

    #[test]
    fn failing_pass_does_not_stop_the_others() {
        let mut diags = Vec::new();
        run_pass(&mut diags, "boom", || -> Vec<Diagnostic> { panic!("validator bug") });
        run_pass(&mut diags, "ok", || {
            vec![Diagnostic::error(
                Range::default(),
                DiagnosticCode::UnclosedBrace,
                "Unclosed brace - missing closing brace",
            )]
        });
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::UnclosedBrace);
    }

    #[test]
    fn passes_run_in_fixed_order() {
        let text = "task a \"A\" {\n  end 2024-13-01\n  depends missing\n}\n}\ntask a \"A\" {}\n";
        let codes: Vec<DiagnosticCode> = validate_document(text, &AnalysisOptions::default())
            .into_iter()
            .map(|d| d.code)
            .collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::InvalidDateValue,
                DiagnosticCode::UnmatchedClosingBrace,
                DiagnosticCode::DuplicateTaskId,
                DiagnosticCode::DuplicateTaskId,
                DiagnosticCode::UndefinedReference,
            ]
        );
    }

    #[test]
    fn clean_document_has_no_diagnostics() {
        let text = "project p \"P\" 2024-01-01 +3m {\n}\nresource dev \"Dev\"\ntask plan \"Plan\" {\n  start 2024-01-02\n  end 2024-01-10\n  allocate dev\n}\ntask impl \"Impl\" {\n  depends plan\n}\n";
        assert!(validate_document(text, &AnalysisOptions::default()).is_empty());
    }
}
