use serde::Serialize;
use std::fmt;

use crate::text::Range;

/// Value of the `source` field on every published diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "taskjuggler";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    UndefinedReference,
    CircularDependency,
    DuplicateTaskId,
    DuplicateResourceId,
    DuplicateAccountId,
    UnmatchedClosingBrace,
    UnclosedBrace,
    InvalidDateFormat,
    InvalidDateValue,
    InvalidDateRange,
    InvalidConstraintRange,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::UndefinedReference => "undefined-reference",
            DiagnosticCode::CircularDependency => "circular-dependency",
            DiagnosticCode::DuplicateTaskId => "duplicate-task-id",
            DiagnosticCode::DuplicateResourceId => "duplicate-resource-id",
            DiagnosticCode::DuplicateAccountId => "duplicate-account-id",
            DiagnosticCode::UnmatchedClosingBrace => "unmatched-closing-brace",
            DiagnosticCode::UnclosedBrace => "unclosed-brace",
            DiagnosticCode::InvalidDateFormat => "invalid-date-format",
            DiagnosticCode::InvalidDateValue => "invalid-date-value",
            DiagnosticCode::InvalidDateRange => "invalid-date-range",
            DiagnosticCode::InvalidConstraintRange => "invalid-constraint-range",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
    pub code: DiagnosticCode,
    /// Always [`DIAGNOSTIC_SOURCE`].
    pub source: &'static str,
}

impl Diagnostic {
    pub fn error(range: Range, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity: Severity::Error,
            code,
            source: DIAGNOSTIC_SOURCE,
        }
    }

    pub fn warning(range: Range, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity: Severity::Warning,
            code,
            source: DIAGNOSTIC_SOURCE,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}] {}", self.range.start, self.severity, self.code, self.message)
    }
}
