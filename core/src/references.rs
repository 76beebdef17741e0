//! Reference extraction: every place an identifier points at a task,
//! resource or account definition.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::keywords;
use crate::scope::ScopeTracker;
use crate::symbols::SymbolKind;
use crate::text::{Line, Range, is_ident_start, scan_lines, span_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceContext {
    Depends,
    Precedes,
    Follows,
    Supplement,
    Allocate,
    Responsible,
    Shifts,
    Charge,
    Revenue,
    Purge,
}

impl ReferenceContext {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceContext::Depends => "depends",
            ReferenceContext::Precedes => "precedes",
            ReferenceContext::Follows => "follows",
            ReferenceContext::Supplement => "supplement",
            ReferenceContext::Allocate => "allocate",
            ReferenceContext::Responsible => "responsible",
            ReferenceContext::Shifts => "shifts",
            ReferenceContext::Charge => "charge",
            ReferenceContext::Revenue => "revenue",
            ReferenceContext::Purge => "purge",
        }
    }
}

impl fmt::Display for ReferenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub target_id: String,
    pub kind: SymbolKind,
    /// Exactly the identifier text, without keyword or `!` markers.
    pub source_range: Range,
    pub context: ReferenceContext,
    /// Innermost task (or supplemented task) the reference sits in.
    pub owner_task: Option<String>,
    /// False for the leading segments of a dotted task path (`phase` in
    /// `phase.plan`): they name ancestors, not the target itself.
    pub leaf: bool,
}

/// Comma-separated list attributes.
static LIST_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(depends|precedes|follows|allocate|responsible|shifts|chargeset)\s+")
        .expect("list keyword regex")
});

static SUPPLEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bsupplement\s+(task|resource)\s+(!*[A-Za-z_][A-Za-z0-9_.]*)")
        .expect("supplement regex")
});

static CHARGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bcharge\s+[^\s,;{}]+\s+([A-Za-z_][A-Za-z0-9_]*)").expect("charge regex")
});

static ACCOUNT_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(revenue|purge)\s+([A-Za-z_][A-Za-z0-9_]*)").expect("account keyword regex")
});

/// Leading id or dotted task path of a list item.
static ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(!*)([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)").expect("item regex"));

const CHARGE_MODES: &[&str] = &["onstart", "onend", "perhour", "perday", "perweek"];

#[derive(Debug, Clone, Copy)]
struct ListRule {
    kind: SymbolKind,
    context: ReferenceContext,
}

impl ListRule {
    fn for_keyword(word: &str) -> Option<Self> {
        let (kind, context) = match word {
            "depends" => (SymbolKind::Task, ReferenceContext::Depends),
            "precedes" => (SymbolKind::Task, ReferenceContext::Precedes),
            "follows" => (SymbolKind::Task, ReferenceContext::Follows),
            "allocate" => (SymbolKind::Resource, ReferenceContext::Allocate),
            "responsible" => (SymbolKind::Resource, ReferenceContext::Responsible),
            "shifts" => (SymbolKind::Resource, ReferenceContext::Shifts),
            "chargeset" => (SymbolKind::Account, ReferenceContext::Charge),
            _ => return None,
        };
        Some(Self { kind, context })
    }
}

/// Reference found on a line, before its owner task is known.
struct Found {
    byte: usize,
    target_id: String,
    kind: SymbolKind,
    range: Range,
    context: ReferenceContext,
    leaf: bool,
}

/// Every reference in `text`, in document order.
pub fn extract_references(text: &str) -> Vec<Reference> {
    let mut refs = Vec::new();
    let mut scopes = ScopeTracker::new();
    // list whose last item ended with a comma on a previous line
    let mut continued: Option<ListRule> = None;

    for line in scan_lines(text).filter(|l| l.is_code()) {
        let mut found = Vec::new();
        let mut from = 0usize;

        if let Some(rule) = continued.take() {
            let (end, more) = parse_list(&line, 0, rule, &mut found);
            from = end;
            if more {
                continued = Some(rule);
            }
        }
        if continued.is_none() {
            continued = scan_keywords(&line, from, &mut found);
        }

        found.sort_by_key(|f| f.byte);
        let mut pending = found.into_iter().peekable();
        scopes.feed_line(&line.code, line.index as u32, |seg, scopes| {
            let owner = scopes.innermost(SymbolKind::Task).map(|e| e.id.clone());
            while let Some(f) = pending.next_if(|f| f.byte <= seg.end) {
                refs.push(Reference {
                    target_id: f.target_id,
                    kind: f.kind,
                    source_range: f.range,
                    context: f.context,
                    owner_task: owner.clone(),
                    leaf: f.leaf,
                });
            }
        });
    }

    tracing::debug!(references = refs.len(), "extracted references");
    refs
}

/// Run every keyword matcher over `line.code[from..]`. Returns the list rule
/// when the last list on the line ends with a trailing comma.
fn scan_keywords(line: &Line<'_>, from: usize, found: &mut Vec<Found>) -> Option<ListRule> {
    let code = &line.code;
    let mut continued = None;

    let mut pos = from;
    while let Some(caps) = LIST_KEYWORD.captures_at(code, pos) {
        let (Some(m), Some(kw)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        // the first item must follow directly: `columns name, depends, effort` is no list
        let starts_item = code[m.end()..].starts_with(|c: char| c == '!' || is_ident_start(c));
        let Some(rule) = ListRule::for_keyword(kw.as_str()).filter(|_| starts_item) else {
            pos = m.end();
            continue;
        };
        let (end, more) = parse_list(line, m.end(), rule, found);
        continued = more.then_some(rule);
        pos = end.max(m.end());
    }

    for caps in SUPPLEMENT.captures_iter(&code[from..]) {
        let (Some(kw), Some(path)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let kind = if kw.as_str() == "task" {
            SymbolKind::Task
        } else {
            SymbolKind::Resource
        };
        push_path(line, from + path.start(), path.as_str(), kind, ReferenceContext::Supplement, found);
    }

    for caps in CHARGE.captures_iter(&code[from..]) {
        let Some(id) = caps.get(1) else { continue };
        if CHARGE_MODES.contains(&id.as_str()) {
            continue;
        }
        push(line, from + id.start(), id.as_str(), SymbolKind::Account, ReferenceContext::Charge, found);
    }

    for caps in ACCOUNT_KEYWORD.captures_iter(&code[from..]) {
        let (Some(kw), Some(id)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let context = if kw.as_str() == "revenue" {
            ReferenceContext::Revenue
        } else {
            ReferenceContext::Purge
        };
        // `purge allocate` clears an inherited attribute
        if context == ReferenceContext::Purge && keywords::is_keyword(id.as_str()) {
            continue;
        }
        push(line, from + id.start(), id.as_str(), SymbolKind::Account, context, found);
    }

    continued
}

/// Parse a comma-separated list starting at byte `start`. Braced option
/// blocks after an item (`depends a { gapduration 2d }`) are skipped; an
/// unmatched `}` ends the list. Returns the end offset and whether the list
/// continues on the next line.
fn parse_list(line: &Line<'_>, start: usize, rule: ListRule, found: &mut Vec<Found>) -> (usize, bool) {
    let code = line.code.as_bytes();
    let mut item_start = start;
    let mut depth = 0u32;
    let mut idx = start;

    while idx < code.len() {
        match code[idx] {
            b'{' => depth += 1,
            b'}' if depth == 0 => break,
            b'}' => depth -= 1,
            b',' if depth == 0 => {
                push_item(line, item_start, rule, found);
                item_start = idx + 1;
            }
            _ => {}
        }
        idx += 1;
    }
    push_item(line, item_start, rule, found);

    let trailing_comma = line.code[start..idx].trim_end().ends_with(',');
    (idx, trailing_comma)
}

fn push_item(line: &Line<'_>, start: usize, rule: ListRule, found: &mut Vec<Found>) {
    let Some(caps) = ITEM.captures(&line.code[start..]) else {
        return;
    };
    let Some(path) = caps.get(2) else { return };
    match rule.kind {
        SymbolKind::Task => push_path(line, start + path.start(), path.as_str(), rule.kind, rule.context, found),
        _ => {
            let id = path.as_str().split('.').next().unwrap_or_default();
            push(line, start + path.start(), id, rule.kind, rule.context, found);
        }
    }
}

/// One reference per dotted segment of a task path (`!!phase.plan`).
fn push_path(
    line: &Line<'_>,
    start: usize,
    path: &str,
    kind: SymbolKind,
    context: ReferenceContext,
    found: &mut Vec<Found>,
) {
    let bangs = path.len() - path.trim_start_matches('!').len();
    let mut offset = start + bangs;
    let first = found.len();
    for segment in path[bangs..].split('.') {
        if !segment.is_empty() {
            push(line, offset, segment, kind, context, found);
        }
        offset += segment.len() + 1;
    }
    if let Some((_, ancestors)) = found[first..].split_last_mut() {
        for f in ancestors {
            f.leaf = false;
        }
    }
}

fn push(
    line: &Line<'_>,
    start: usize,
    id: &str,
    kind: SymbolKind,
    context: ReferenceContext,
    found: &mut Vec<Found>,
) {
    found.push(Found {
        byte: start,
        target_id: id.to_string(),
        kind,
        range: span_range(line.index, line.text, start, start + id.len()),
        context,
        leaf: true,
    });
}
