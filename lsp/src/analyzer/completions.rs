use tjls_core::keywords::KeywordInfo;
use tjls_core::{CandidateKind, CompletionCandidate};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Documentation, MarkupContent, MarkupKind};

pub fn to_completion_item(candidate: CompletionCandidate) -> CompletionItem {
    let kind = match candidate.kind {
        CandidateKind::Reference => CompletionItemKind::REFERENCE,
        CandidateKind::Date => CompletionItemKind::CONSTANT,
        CandidateKind::Keyword => CompletionItemKind::KEYWORD,
    };
    CompletionItem {
        label: candidate.label,
        kind: Some(kind),
        detail: candidate.detail,
        documentation: candidate.documentation.map(|value| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            })
        }),
        insert_text: Some(candidate.insert_text),
        sort_text: candidate.sort_text,
        ..Default::default()
    }
}

/// Markdown hover body for a keyword: name, category, description and syntax.
pub fn hover_markdown(info: &KeywordInfo) -> String {
    let mut out = format!("**{}** *({})*\n\n{}\n", info.name, info.category, info.description);
    if let Some(syntax) = info.syntax {
        out.push_str(&format!("\n**Syntax:**\n```taskjuggler\n{syntax}\n```\n"));
    }
    out
}
