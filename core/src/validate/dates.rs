//! Date literal checks: well-formed calendar dates after date attributes, and
//! per-task ordering of start/end and the min/max constraints.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::scope::ScopeTracker;
use crate::symbols::SymbolKind;
use crate::text::{Range, scan_lines, span_range};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Not shaped like `YYYY-MM-DD[-HH:MM[:SS]]`.
    Format,
    /// Shaped correctly but not a real calendar date or time.
    Value,
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateError::Format => f.write_str("expected YYYY-MM-DD"),
            DateError::Value => f.write_str("not a valid calendar date"),
        }
    }
}

impl std::error::Error for DateError {}

static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:-(\d{2}):(\d{2})(?::(\d{2}))?)?$").expect("date shape regex")
});

static DATE_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(start|end|minstart|maxstart|minend|maxend)\s+([^\s,;{}\]]+)").expect("date attribute regex")
});

/// Words after which a date keyword is an identifier, not an attribute
/// (`task start "Kickoff"`, `depends start`).
const IDENT_POSITION: &[&str] = &[
    "task",
    "resource",
    "account",
    "scenario",
    "macro",
    "supplement",
    "depends",
    "precedes",
    "follows",
    "allocate",
    "responsible",
    "chargeset",
];

/// Parse a TaskJuggler date literal.
pub fn parse_date(token: &str) -> Result<NaiveDateTime, DateError> {
    let caps = DATE_SHAPE.captures(token).ok_or(DateError::Format)?;
    let num = |i: usize| caps.get(i).map_or(Ok(0), |m| m.as_str().parse::<u32>()).map_err(|_| DateError::Format);

    let year = caps[1].parse::<i32>().map_err(|_| DateError::Format)?;
    let date = NaiveDate::from_ymd_opt(year, num(2)?, num(3)?).ok_or(DateError::Value)?;
    let time = NaiveTime::from_hms_opt(num(4)?, num(5)?, num(6)?).ok_or(DateError::Value)?;
    Ok(date.and_time(time))
}

/// Check one date token. Macro values (`${now}`) are accepted as is.
pub fn validate_date_format(token: &str, range: Range) -> Option<Diagnostic> {
    if token.starts_with('$') {
        return None;
    }
    match parse_date(token) {
        Ok(_) => None,
        Err(DateError::Format) => Some(Diagnostic::error(
            range,
            DiagnosticCode::InvalidDateFormat,
            format!("Invalid date format. Expected YYYY-MM-DD, got: {token}"),
        )),
        Err(DateError::Value) => Some(Diagnostic::error(
            range,
            DiagnosticCode::InvalidDateValue,
            format!("Invalid date: {token} (e.g., month must be 01-12, day must be valid for month)"),
        )),
    }
}

#[derive(Debug, Clone)]
struct DateToken {
    keyword: String,
    text: String,
    range: Range,
    /// Serial of the innermost enclosing task scope.
    task: Option<usize>,
}

fn date_tokens(text: &str) -> Vec<DateToken> {
    let mut tokens = Vec::new();
    let mut scopes = ScopeTracker::new();

    for line in scan_lines(text).filter(|l| l.is_code()) {
        let matches: Vec<_> = DATE_ATTRIBUTE
            .captures_iter(&line.code)
            .filter_map(|caps| Some((caps.get(1)?, caps.get(2)?)))
            .filter(|(kw, value)| !in_ident_position(&line.code[..kw.start()]) && !is_quoted(value.as_str()))
            .map(|(kw, value)| (kw.as_str().to_ascii_lowercase(), value.start(), value.end()))
            .collect();
        if matches.is_empty() {
            scopes.feed_line(&line.code, line.index as u32, |_, _| {});
            continue;
        }

        let mut pending = matches.into_iter().peekable();
        scopes.feed_line(&line.code, line.index as u32, |seg, scopes| {
            let task = scopes.innermost(SymbolKind::Task).map(|e| e.serial);
            while let Some((keyword, start, end)) = pending.next_if(|(_, start, _)| *start <= seg.end) {
                tokens.push(DateToken {
                    keyword,
                    text: line.text[start..end].to_string(),
                    range: span_range(line.index, line.text, start, end),
                    task,
                });
            }
        });
    }
    tokens
}

fn in_ident_position(before: &str) -> bool {
    before
        .split_whitespace()
        .next_back()
        .is_some_and(|w| IDENT_POSITION.contains(&w))
}

fn is_quoted(value: &str) -> bool {
    value.starts_with('"') || value.starts_with('\'')
}

/// Ordering checks per task: `end` after `start`, `maxstart` after
/// `minstart`, `maxend` after `minend`. Only well-formed dates take part and
/// a repeated attribute replaces the earlier one.
pub fn validate_date_logic(text: &str) -> Vec<Diagnostic> {
    let tokens = date_tokens(text);
    check_logic(&tokens)
}

fn check_logic(tokens: &[DateToken]) -> Vec<Diagnostic> {
    let mut per_task: BTreeMap<usize, HashMap<&str, (NaiveDateTime, &DateToken)>> = BTreeMap::new();
    for token in tokens {
        let (Some(task), Ok(value)) = (token.task, parse_date(&token.text)) else {
            continue;
        };
        per_task
            .entry(task)
            .or_default()
            .insert(token.keyword.as_str(), (value, token));
    }

    let mut diags = Vec::new();
    for dates in per_task.values() {
        if let (Some((start, s)), Some((end, e))) = (dates.get("start"), dates.get("end")) {
            if end <= start {
                diags.push(Diagnostic::error(
                    e.range,
                    DiagnosticCode::InvalidDateRange,
                    format!("End date ({}) must be after start date ({})", e.text, s.text),
                ));
            }
        }
        for (min_key, max_key) in [("minstart", "maxstart"), ("minend", "maxend")] {
            if let (Some((min, lo)), Some((max, hi))) = (dates.get(min_key), dates.get(max_key)) {
                if max <= min {
                    diags.push(Diagnostic::warning(
                        hi.range,
                        DiagnosticCode::InvalidConstraintRange,
                        format!("{max_key} ({}) must be after {min_key} ({})", hi.text, lo.text),
                    ));
                }
            }
        }
    }
    diags
}

/// Format check for every date attribute, followed by the logic check.
pub fn validate_dates(text: &str) -> Vec<Diagnostic> {
    let tokens = date_tokens(text);
    let mut diags: Vec<Diagnostic> = tokens
        .iter()
        .filter_map(|t| validate_date_format(&t.text, t.range))
        .collect();
    diags.extend(check_logic(&tokens));
    diags
}
