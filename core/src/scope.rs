//! Brace-depth scope tracking shared by the symbol, reference and date passes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::symbols::{SymbolKind, definition_opener};

static SUPPLEMENT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*supplement\s+(task|resource)\s+!*([A-Za-z_][A-Za-z0-9_.]*)")
        .expect("supplement regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Brace {
    Open,
    Close,
}

/// Run of masked code between braces on one line. `start..end` are byte
/// offsets into the line; `brace` is the delimiter that ends the run, if any.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Segment {
    pub start: usize,
    pub end: usize,
    pub brace: Option<Brace>,
}

pub(crate) fn segments(code: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut start = 0usize;
    for (idx, b) in code.bytes().enumerate() {
        let brace = match b {
            b'{' => Brace::Open,
            b'}' => Brace::Close,
            _ => continue,
        };
        out.push(Segment {
            start,
            end: idx,
            brace: Some(brace),
        });
        start = idx + 1;
    }
    out.push(Segment {
        start,
        end: code.len(),
        brace: None,
    });
    out
}

/// A scope opened by a definition (`task x {`) or a supplement (`supplement task x {`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScopeEntry {
    pub kind: SymbolKind,
    pub id: String,
    /// Line the scope was introduced on.
    pub line: u32,
    /// Running number of opened scopes; distinguishes two blocks with the same id.
    pub serial: usize,
    depth: u32,
}

/// Candidate scope introduced by a segment.
#[derive(Debug, Clone)]
pub(crate) struct Opener {
    pub kind: SymbolKind,
    pub id: String,
    pub line: u32,
}

/// A segment with no identifier characters. Quote delimiters left behind by
/// masking do not count, so a name string spilling onto the next line still
/// lets its definition open on that line's brace.
pub(crate) fn is_blank_segment(code: &str) -> bool {
    !code.bytes().any(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Scope introduced at the start of a segment: a definition, or a supplement
/// of an existing task/resource (which scopes as its last path segment).
pub(crate) fn scope_opener(code: &str, line: u32) -> Option<Opener> {
    if let Some(op) = definition_opener(code, line) {
        return Some(op);
    }
    let caps = SUPPLEMENT_BLOCK.captures(code)?;
    let id = caps[2].rsplit('.').next().unwrap_or_default().to_string();
    Some(Opener {
        kind: SymbolKind::from_keyword(&caps[1])?,
        id,
        line,
    })
}

/// Depth counter plus a stack of open named scopes.
///
/// Depth is clamped at zero: surplus closing braces are ignored here and are
/// reported separately by the brace validator.
#[derive(Debug, Default)]
pub(crate) struct ScopeTracker {
    depth: u32,
    entries: Vec<ScopeEntry>,
    pending: Option<Opener>,
    opened: usize,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Innermost open scope of `kind` that was opened at a shallower depth
    /// than the current one.
    pub fn innermost(&self, kind: SymbolKind) -> Option<&ScopeEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.kind == kind && e.depth < self.depth)
    }

    /// Innermost open scope of any kind.
    pub fn top(&self) -> Option<&ScopeEntry> {
        self.entries.last()
    }

    /// Feed one segment. `opener` is the scope the segment's text introduces;
    /// `blank` says whether the segment holds no code at all. A definition
    /// without a brace stays pending until the next brace, as long as only
    /// blank code separates them.
    pub fn feed(&mut self, opener: Option<Opener>, blank: bool, brace: Option<Brace>) {
        let candidate = match opener {
            Some(op) => Some(op),
            None if blank => self.pending.take(),
            None => {
                self.pending = None;
                None
            }
        };

        match brace {
            Some(Brace::Open) => {
                if let Some(op) = candidate {
                    self.opened += 1;
                    self.entries.push(ScopeEntry {
                        kind: op.kind,
                        id: op.id,
                        line: op.line,
                        serial: self.opened,
                        depth: self.depth,
                    });
                }
                self.depth += 1;
            }
            Some(Brace::Close) => {
                self.pending = None;
                self.close();
            }
            None => self.pending = candidate,
        }
    }

    /// Feed a whole masked line. `visit` sees every segment together with the
    /// scopes in effect before that segment's brace is applied.
    pub fn feed_line(&mut self, code: &str, line: u32, mut visit: impl FnMut(Segment, &ScopeTracker)) {
        for seg in segments(code) {
            visit(seg, self);
            let part = &code[seg.start..seg.end];
            self.feed(scope_opener(part, line), is_blank_segment(part), seg.brace);
        }
    }

    fn close(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        while self.entries.last().is_some_and(|e| e.depth >= self.depth) {
            self.entries.pop();
        }
    }
}
