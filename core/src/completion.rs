//! Completion candidates at a cursor position.

use chrono::{Days, Local, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::context::context_at;
use crate::keywords::{self, KeywordInfo, block_attributes, top_level_properties};
use crate::symbols::{SymbolKind, extract_symbols};
use crate::text::{Position, byte_offset, scan_lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    /// Id of a task, resource or account defined in the document.
    Reference,
    Date,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionCandidate {
    pub label: String,
    pub kind: CandidateKind,
    pub insert_text: String,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    /// Dates sort ahead of everything else.
    pub sort_text: Option<String>,
}

static TASK_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(depends|precedes|follows)\s+[!A-Za-z0-9_.,\s]*$").expect("task list regex"));

static RESOURCE_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(allocate|responsible)\s+[A-Za-z0-9_,\s]*$").expect("resource list regex"));

static ACCOUNT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(chargeset|revenue)\s+[A-Za-z0-9_]*$").expect("account value regex"));

static DATE_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(start|end|minstart|maxstart|minend|maxend|now)\s+[^\s]*$").expect("date value regex")
});

/// Candidates at `pos`, with date suggestions relative to the local date.
pub fn complete_at(text: &str, pos: Position) -> Vec<CompletionCandidate> {
    complete_at_on(text, pos, Local::now().date_naive())
}

/// Like [`complete_at`] with an explicit "today".
pub fn complete_at_on(text: &str, pos: Position, today: NaiveDate) -> Vec<CompletionCandidate> {
    let prefix = line_prefix(text, pos);

    let reference_kind = if TASK_LIST.is_match(&prefix) {
        Some(SymbolKind::Task)
    } else if RESOURCE_LIST.is_match(&prefix) {
        Some(SymbolKind::Resource)
    } else if ACCOUNT_VALUE.is_match(&prefix) {
        Some(SymbolKind::Account)
    } else {
        None
    };
    if let Some(kind) = reference_kind {
        return reference_candidates(text, kind);
    }
    if DATE_VALUE.is_match(&prefix) {
        return date_candidates(today);
    }

    let ctx = context_at(text, pos);
    if !ctx.in_block() {
        return top_level_properties().map(keyword_candidate).collect();
    }
    block_attributes(ctx.block_kind)
        .iter()
        .filter(|name| !ctx.used_attribute_names.contains(**name))
        .map(|name| match keywords::keyword(name) {
            Some(info) => keyword_candidate(info),
            None => CompletionCandidate {
                label: name.to_string(),
                kind: CandidateKind::Keyword,
                insert_text: name.to_string(),
                detail: None,
                documentation: None,
                sort_text: None,
            },
        })
        .collect()
}

/// Masked text of the cursor line up to the cursor, so comments and strings
/// never trigger a reference or date context.
fn line_prefix(text: &str, pos: Position) -> String {
    scan_lines(text)
        .nth(pos.line as usize)
        .map(|line| {
            let cut = byte_offset(line.text, pos.character);
            line.code.get(..cut).unwrap_or_default().to_string()
        })
        .unwrap_or_default()
}

fn reference_candidates(text: &str, kind: SymbolKind) -> Vec<CompletionCandidate> {
    let table = extract_symbols(text);
    let label = match kind {
        SymbolKind::Task => "Task",
        SymbolKind::Resource => "Resource",
        _ => "Account",
    };
    table
        .of_kind(kind)
        .iter()
        .map(|sym| CompletionCandidate {
            label: sym.id.clone(),
            kind: CandidateKind::Reference,
            insert_text: sym.id.clone(),
            detail: Some(format!("{label}: {}", sym.name)),
            documentation: Some(format!("Reference to {} \"{}\"", kind.keyword(), sym.name)),
            sort_text: None,
        })
        .collect()
}

fn date_candidates(today: NaiveDate) -> Vec<CompletionCandidate> {
    let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
    let mut dates = vec![("today", fmt(today), "Current date")];
    if let Some(d) = today.checked_add_days(Days::new(1)) {
        dates.push(("tomorrow", fmt(d), "Tomorrow's date"));
    }
    if let Some(d) = today.checked_add_days(Days::new(7)) {
        dates.push(("next week", fmt(d), "One week from today"));
    }
    if let Some(d) = today.checked_add_months(Months::new(1)) {
        dates.push(("next month", fmt(d), "One month from today"));
    }
    dates.push(("${now}", "${now}".to_string(), "Project's current date macro"));

    dates
        .into_iter()
        .map(|(label, value, description)| CompletionCandidate {
            label: label.to_string(),
            kind: CandidateKind::Date,
            detail: Some(format!("Date: {value}")),
            insert_text: value,
            documentation: Some(description.to_string()),
            sort_text: Some(format!("a{label}")),
        })
        .collect()
}

fn keyword_candidate(info: &KeywordInfo) -> CompletionCandidate {
    CompletionCandidate {
        label: info.name.to_string(),
        kind: CandidateKind::Keyword,
        insert_text: info.name.to_string(),
        detail: info.syntax.map(str::to_string),
        documentation: Some(info.description.to_string()),
        sort_text: None,
    }
}
